use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process;
use std::str::FromStr;

use anyhow::{anyhow, bail};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use log::info;

use univote::api::{AdminApi, DirectoryApi, ElectionApi, HttpClient};
use univote::ballot::{Ballot, BallotState, Submitted, Voting};
use univote::dashboard::{self, ElectionListing, StudentDashboard};
use univote::guard::{self, Guard, Route};
use univote::model::{
    CandidateForm, CandidatesByPosition, Credentials, DepartmentForm, Election, ElectionCategory,
    ElectionForm, ElectionPhase, FacultyForm, Id, ProfileUpdate, Registration, Role, User,
    UserUpdate,
};
use univote::results::ResultsPage;
use univote::session::Session;
use univote::token::FileTokenStore;
use univote::{logging, Config, Error};

#[derive(Parser)]
#[command(author, version, about)]
struct Args {
    /// Use the API at this URL instead of the configured one.
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Silence the per-request log.
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Log in and remember the session.
    Login {
        #[arg(long)]
        matric: String,
        /// Read from standard input when omitted.
        #[arg(long)]
        password: Option<String>,
    },
    /// Create a student account.
    Register {
        #[arg(long)]
        first_name: String,
        #[arg(long)]
        last_name: String,
        #[arg(long)]
        matric: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        confirm_password: String,
        #[arg(long)]
        faculty: Id,
        #[arg(long)]
        department: Id,
        #[arg(long)]
        image: Option<PathBuf>,
    },
    /// Forget the stored session.
    Logout,
    /// Show the logged-in user.
    Whoami,
    /// Show where navigating to a path leads for the current session.
    Navigate { path: String },
    /// Show, or with any field given update, your profile.
    Profile {
        #[arg(long)]
        first_name: Option<String>,
        #[arg(long)]
        last_name: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        faculty: Option<Id>,
        #[arg(long)]
        department: Option<Id>,
        #[arg(long)]
        image: Option<PathBuf>,
    },
    /// Upcoming and active elections, and your recent votes.
    Dashboard,
    /// Active, upcoming and past elections.
    Elections,
    /// Vote in an election, one position at a time.
    Vote {
        election: Id,
        /// Vote without prompting; may be repeated.
        #[arg(long = "choice", value_name = "POSITION=CANDIDATE_ID")]
        choices: Vec<Choice>,
    },
    /// Results of a completed election (the first one by default).
    Results {
        election: Option<Id>,
        /// Also print the chart projections as JSON.
        #[arg(long)]
        charts: bool,
    },
    Faculties,
    Departments {
        #[arg(long)]
        faculty: Option<Id>,
    },
    /// Administration.
    Admin {
        #[command(subcommand)]
        command: AdminCommand,
    },
}

#[derive(Subcommand)]
enum AdminCommand {
    Dashboard,
    /// List elections, optionally in one phase.
    Elections {
        #[arg(long, value_enum)]
        phase: Option<ElectionPhase>,
    },
    CreateElection {
        #[arg(long)]
        title: String,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long)]
        category: ElectionCategory,
        /// RFC 3339 timestamp.
        #[arg(long)]
        start: DateTime<Utc>,
        /// RFC 3339 timestamp.
        #[arg(long)]
        end: DateTime<Utc>,
    },
    UpdateElection {
        id: Id,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        category: Option<ElectionCategory>,
        #[arg(long)]
        start: Option<DateTime<Utc>>,
        #[arg(long)]
        end: Option<DateTime<Utc>>,
    },
    DeleteElection { id: Id },
    /// Candidates of an election (the first one by default).
    Candidates { election: Option<Id> },
    AddCandidate {
        #[arg(long)]
        election: Id,
        #[arg(long)]
        first_name: String,
        #[arg(long)]
        last_name: String,
        #[arg(long)]
        matric: String,
        #[arg(long)]
        position: String,
        #[arg(long, default_value = "")]
        manifesto: String,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        image: Option<PathBuf>,
    },
    UpdateCandidate {
        id: Id,
        /// Election the candidate stands in.
        #[arg(long)]
        election: Id,
        #[arg(long)]
        first_name: Option<String>,
        #[arg(long)]
        last_name: Option<String>,
        #[arg(long)]
        matric: Option<String>,
        #[arg(long)]
        position: Option<String>,
        #[arg(long)]
        manifesto: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        image: Option<PathBuf>,
    },
    DeleteCandidate { id: Id },
    Users,
    UpdateUser {
        id: Id,
        #[arg(long)]
        first_name: Option<String>,
        #[arg(long)]
        last_name: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        matric: Option<String>,
        #[arg(long)]
        faculty: Option<Id>,
        #[arg(long)]
        department: Option<Id>,
        #[arg(long, value_enum)]
        role: Option<Role>,
    },
    DeleteUser { id: Id },
    AddFaculty { name: String },
    RenameFaculty { id: Id, name: String },
    DeleteFaculty { id: Id },
    AddDepartment {
        name: String,
        #[arg(long)]
        faculty: Id,
    },
    UpdateDepartment {
        id: Id,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        faculty: Option<Id>,
    },
    DeleteDepartment { id: Id },
}

/// A `POSITION=CANDIDATE_ID` pair given on the command line.
#[derive(Debug, Clone)]
struct Choice {
    position: String,
    candidate: Id,
}

impl FromStr for Choice {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (position, candidate) = s
            .rsplit_once('=')
            .ok_or_else(|| format!("expected POSITION=CANDIDATE_ID, got '{s}'"))?;
        Ok(Self {
            position: position.trim().to_string(),
            candidate: candidate.parse()?,
        })
    }
}

impl Command {
    /// The view this command stands in for, if it is gated.
    fn route(&self) -> Option<Route> {
        let route = match self {
            Self::Profile { .. } => Route::Profile,
            Self::Dashboard => Route::Dashboard,
            Self::Elections => Route::Elections,
            Self::Vote { election, .. } => Route::Vote(election.clone()),
            Self::Results { election, .. } => Route::Results(election.clone()),
            Self::Admin { command } => command.route(),
            _ => return None,
        };
        Some(route)
    }
}

impl AdminCommand {
    fn route(&self) -> Route {
        match self {
            Self::Dashboard => Route::AdminDashboard,
            Self::Elections { .. }
            | Self::CreateElection { .. }
            | Self::UpdateElection { .. }
            | Self::DeleteElection { .. } => Route::AdminElections,
            Self::Candidates { .. }
            | Self::AddCandidate { .. }
            | Self::UpdateCandidate { .. }
            | Self::DeleteCandidate { .. } => Route::AdminCandidates,
            Self::Users | Self::UpdateUser { .. } | Self::DeleteUser { .. } => Route::AdminUsers,
            _ => Route::AdminSettings,
        }
    }
}

type Client = Session<HttpClient>;

/// Turn an API failure into the notice shown to the user.
fn notice(fallback: &'static str) -> impl Fn(Error) -> anyhow::Error {
    move |err| {
        log::error!("{fallback}: {err}");
        anyhow!(err.user_message(fallback))
    }
}

/// Apply the role guard for `route`.
fn enter(session: &Client, route: &Route) -> anyhow::Result<()> {
    match guard::check(session.state(), route.required_role()) {
        Guard::Render => Ok(()),
        Guard::Loading => bail!("Session has not been resolved yet"),
        Guard::Redirect(Route::Login) => {
            bail!("Please log in first: univote login --matric <MATRIC_NUMBER>")
        }
        Guard::Redirect(home) => bail!("{route} is not available to your account, see {home}"),
    }
}

fn prompt(message: &str) -> anyhow::Result<Option<String>> {
    print!("{message}");
    io::stdout().flush()?;
    let mut line = String::new();
    if io::stdin().lock().read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

fn print_elections(elections: &[Election]) {
    if elections.is_empty() {
        println!("  (none)");
    }
    let now = Utc::now();
    for election in elections {
        println!(
            "  {}  {} [{}, {}]  {} to {}",
            election.id,
            election.title,
            election.category,
            election.status_at(now),
            election.start_date.format("%Y-%m-%d %H:%M"),
            election.end_date.format("%Y-%m-%d %H:%M"),
        );
        if !election.description.is_empty() {
            println!("      {}", election.summary(100));
        }
    }
}

fn print_user(user: &User) {
    let faculty = user.faculty.as_ref().map(|f| f.label()).unwrap_or("-");
    let department = user.department.as_ref().map(|d| d.label()).unwrap_or("-");
    println!(
        "  {}  {} ({}) <{}>  {}  {} / {}",
        user.id,
        user.full_name(),
        user.matric_number,
        user.email,
        user.role,
        faculty,
        department,
    );
}

fn print_candidates(candidates: &CandidatesByPosition) {
    if candidates.is_empty() {
        println!("No candidates yet.");
    }
    for position in candidates.positions() {
        println!("{position}:");
        for candidate in candidates.get(position) {
            println!(
                "  {}  {} ({})",
                candidate.id,
                candidate.full_name(),
                candidate.matric_number
            );
        }
    }
}

fn login(session: &mut Client, matric: String, password: Option<String>) -> anyhow::Result<()> {
    let password = match password {
        Some(password) => password,
        None => prompt("Password: ")?.ok_or_else(|| anyhow!("No password given"))?,
    };
    let credentials = Credentials {
        matric_number: matric,
        password,
    };
    let user = session.login(&credentials).map_err(|err| {
        log::error!("Login failed: {err}");
        match err {
            Error::Unauthenticated(message)
            | Error::Rejected {
                message: Some(message),
                ..
            } => anyhow!(message),
            other => anyhow!(other.user_message("Login failed")),
        }
    })?;
    println!("Logged in as {} ({})", user.full_name(), user.role);
    println!("Home: {}", Route::home(user.role));
    Ok(())
}

fn show_dashboard(api: &HttpClient, user: &User) -> anyhow::Result<()> {
    let dashboard = StudentDashboard::load(api).map_err(notice("Failed to load dashboard"))?;
    println!("Welcome, {}!", user.first_name);
    println!("\nActive elections:");
    print_elections(&dashboard.active);
    println!("\nUpcoming elections:");
    print_elections(&dashboard.upcoming);
    println!("\nRecent votes:");
    if dashboard.history.is_empty() {
        println!("  You have not voted yet.");
    }
    for vote in dashboard.recent_votes() {
        println!(
            "  {}  {}: {} {} ({})",
            vote.created_at.format("%Y-%m-%d"),
            vote.election.title,
            vote.candidate.first_name,
            vote.candidate.last_name,
            vote.candidate.position,
        );
    }
    Ok(())
}

fn show_position(voting: &Voting) {
    let (voted, available) = voting.progress();
    let position = voting.current_position();
    println!(
        "\n{}: {} ({voted} of {available} positions voted)",
        voting.election().title,
        position
    );
    if voting.is_voted(position) {
        println!("  You have already voted for this position.");
    }
    let selected = voting.selection(position);
    for (i, candidate) in voting.current_candidates().iter().enumerate() {
        let marker = if selected == Some(&candidate.id) { "*" } else { " " };
        println!("{marker} {}. {}", i + 1, candidate.full_name());
        if !candidate.manifesto.is_empty() {
            println!("     {}", candidate.manifesto_excerpt());
        }
    }
}

fn report(submitted: &Submitted) {
    match submitted {
        Submitted::Next { recorded, next } => {
            println!("Your vote for {recorded} has been recorded successfully!");
            println!("Next position: {next}");
        }
        Submitted::Completed { recorded } => {
            println!("Your vote for {recorded} has been recorded successfully!");
            println!("You have successfully voted for all positions in this election!");
        }
    }
}

fn vote_interactively(api: &HttpClient, ballot: &mut Ballot) -> anyhow::Result<()> {
    while let Some(voting) = ballot.voting() {
        show_position(voting);
        let Some(input) =
            prompt("Number to select, 'v' to vote, 'p POSITION' to switch, 'q' to quit: ")?
        else {
            break;
        };

        let outcome = if input == "q" {
            break;
        } else if input == "v" {
            ballot.submit(api).map(|submitted| report(&submitted))
        } else if let Some(position) = input.strip_prefix("p ") {
            ballot.switch_position(position.trim())
        } else if let Ok(n) = input.parse::<usize>() {
            let candidate = n
                .checked_sub(1)
                .and_then(|i| voting.current_candidates().get(i))
                .map(|c| c.id.clone());
            match candidate {
                Some(candidate) => ballot.select(&candidate),
                None => {
                    eprintln!("No candidate number {n}");
                    continue;
                }
            }
        } else {
            eprintln!("Unrecognised input '{input}'");
            continue;
        };

        if let Err(err) = outcome {
            eprintln!("{err}");
        }
    }
    Ok(())
}

fn vote(api: &HttpClient, election: Id, choices: Vec<Choice>) -> anyhow::Result<()> {
    let mut ballot = Ballot::open(api, election);
    match ballot.state() {
        BallotState::Error(message) => bail!("{message}"),
        BallotState::Completed => {
            println!("You have already voted for all positions in this election.");
            return Ok(());
        }
        BallotState::Loading | BallotState::Voting(_) => {}
    }

    if choices.is_empty() {
        return vote_interactively(api, &mut ballot);
    }
    for choice in choices {
        ballot.switch_position(&choice.position)?;
        ballot.select(&choice.candidate)?;
        report(&ballot.submit(api)?);
    }
    if let Some(voting) = ballot.voting() {
        println!("Still to vote: {}", voting.remaining_positions().join(", "));
    }
    Ok(())
}

fn results(api: &HttpClient, election: Option<Id>, charts: bool) -> anyhow::Result<()> {
    match ResultsPage::load(api, election.as_ref()) {
        ResultsPage::Failed(message) => bail!("{message}"),
        ResultsPage::NoCompletedElections => println!("No completed elections available yet."),
        ResultsPage::Ready {
            elections,
            selected,
            results,
        } => {
            println!("{} [{}]", selected.title, selected.category);
            if !selected.description.is_empty() {
                println!("{}", selected.description);
            }
            println!();
            let view = results.map_err(|message| anyhow!(message))?;
            print!("{view}");
            if charts && !view.is_empty() {
                println!("\nPie chart: {}", serde_json::to_string(&view.pie_chart())?);
                println!("Bar chart: {}", serde_json::to_string(&view.bar_chart())?);
            }
            let others: Vec<_> = elections.iter().filter(|e| e.id != selected.id).collect();
            if !others.is_empty() {
                println!("\nOther completed elections:");
                for election in others {
                    println!("  {}  {}", election.id, election.title);
                }
            }
        }
    }
    Ok(())
}

fn list_departments(api: &HttpClient, faculty: Option<&Id>) -> anyhow::Result<()> {
    let departments = api
        .departments(faculty)
        .map_err(notice("Failed to load departments"))?;
    for department in departments {
        println!(
            "  {}  {} ({})",
            department.id,
            department.name,
            department.faculty.label()
        );
    }
    Ok(())
}

fn admin(api: &HttpClient, command: AdminCommand) -> anyhow::Result<()> {
    match command {
        AdminCommand::Dashboard => {
            let dashboard = dashboard::admin_dashboard(api);
            println!("Users:       {}", dashboard.total_users);
            println!("Elections:   {} ({} active)", dashboard.total_elections, dashboard.active_elections);
            println!("Candidates:  {}", dashboard.total_candidates);
            println!("Votes:       {}", dashboard.total_votes);
            println!("\nRecent elections:");
            print_elections(&dashboard.recent_elections);
            if !dashboard.recent_users.is_empty() {
                println!("\nRecent users:");
                dashboard.recent_users.iter().for_each(print_user);
            }
        }
        AdminCommand::Elections { phase } => {
            let elections = api
                .admin_elections(phase)
                .map_err(notice("Failed to load elections"))?;
            print_elections(&elections);
        }
        AdminCommand::CreateElection {
            title,
            description,
            category,
            start,
            end,
        } => {
            let form = ElectionForm {
                title,
                description,
                category,
                start_date: start,
                end_date: end,
            };
            form.validate().map_err(|message| anyhow!(message))?;
            api.create_election(&form)
                .map_err(notice("Failed to save election"))?;
            println!("Election created successfully");
        }
        AdminCommand::UpdateElection {
            id,
            title,
            description,
            category,
            start,
            end,
        } => {
            let election = api.election(&id).map_err(notice("Failed to load elections"))?;
            let mut form = ElectionForm::from(&election);
            form.title = title.unwrap_or(form.title);
            form.description = description.unwrap_or(form.description);
            form.category = category.unwrap_or(form.category);
            form.start_date = start.unwrap_or(form.start_date);
            form.end_date = end.unwrap_or(form.end_date);
            form.validate().map_err(|message| anyhow!(message))?;
            api.update_election(&id, &form)
                .map_err(notice("Failed to save election"))?;
            println!("Election updated successfully");
        }
        AdminCommand::DeleteElection { id } => {
            api.delete_election(&id)
                .map_err(notice("Failed to delete election"))?;
            println!("Election deleted successfully");
        }
        AdminCommand::Candidates { election } => {
            let elections =
                dashboard::candidate_elections(api).map_err(notice("Failed to load elections"))?;
            let Some(election) = election.or_else(|| elections.first().map(|e| e.id.clone()))
            else {
                println!("No elections yet.");
                return Ok(());
            };
            if let Some(found) = elections.iter().find(|e| e.id == election) {
                println!("{}", found.title);
            }
            let candidates = api
                .candidates(&election)
                .map_err(notice("Failed to load candidates"))?;
            print_candidates(&CandidatesByPosition::group(candidates));
        }
        AdminCommand::AddCandidate {
            election,
            first_name,
            last_name,
            matric,
            position,
            manifesto,
            email,
            image,
        } => {
            let form = CandidateForm {
                first_name,
                last_name,
                email,
                matric_number: matric,
                position,
                manifesto,
                election_id: election,
                profile_image: image,
            };
            api.create_candidate(&form)
                .map_err(notice("Failed to save candidate"))?;
            println!("Candidate created successfully");
        }
        AdminCommand::UpdateCandidate {
            id,
            election,
            first_name,
            last_name,
            matric,
            position,
            manifesto,
            email,
            image,
        } => {
            let candidates = api
                .candidates(&election)
                .map_err(notice("Failed to load candidates"))?;
            let candidate = candidates
                .into_iter()
                .find(|c| c.id == id)
                .ok_or_else(|| anyhow!("Candidate {id} is not standing in election {election}"))?;
            let form = CandidateForm {
                first_name: first_name.unwrap_or(candidate.first_name),
                last_name: last_name.unwrap_or(candidate.last_name),
                email: email.or(candidate.email),
                matric_number: matric.unwrap_or(candidate.matric_number),
                position: position.unwrap_or(candidate.position),
                manifesto: manifesto.unwrap_or(candidate.manifesto),
                election_id: election,
                profile_image: image,
            };
            api.update_candidate(&id, &form)
                .map_err(notice("Failed to save candidate"))?;
            println!("Candidate updated successfully");
        }
        AdminCommand::DeleteCandidate { id } => {
            api.delete_candidate(&id)
                .map_err(notice("Failed to delete candidate"))?;
            println!("Candidate deleted successfully");
        }
        AdminCommand::Users => {
            let users = api.users().map_err(notice("Failed to load users"))?;
            users.iter().for_each(print_user);
        }
        AdminCommand::UpdateUser {
            id,
            first_name,
            last_name,
            email,
            matric,
            faculty,
            department,
            role,
        } => {
            let users = api.users().map_err(notice("Failed to load users"))?;
            let user = users
                .iter()
                .find(|u| u.id == id)
                .ok_or_else(|| anyhow!("No user {id}"))?;
            let mut update = UserUpdate::from(user);
            update.first_name = first_name.unwrap_or(update.first_name);
            update.last_name = last_name.unwrap_or(update.last_name);
            update.email = email.unwrap_or(update.email);
            update.matric_number = matric.unwrap_or(update.matric_number);
            update.faculty = faculty.or(update.faculty);
            update.department = department.or(update.department);
            update.role = role.unwrap_or(update.role);
            api.update_user(&id, &update)
                .map_err(notice("Failed to update user"))?;
            println!("User updated successfully");
        }
        AdminCommand::DeleteUser { id } => {
            api.delete_user(&id).map_err(notice("Failed to delete user"))?;
            println!("User deleted successfully");
        }
        AdminCommand::AddFaculty { name } => {
            api.create_faculty(&FacultyForm { name })
                .map_err(notice("Failed to save faculty"))?;
            println!("Faculty created successfully");
        }
        AdminCommand::RenameFaculty { id, name } => {
            api.update_faculty(&id, &FacultyForm { name })
                .map_err(notice("Failed to save faculty"))?;
            println!("Faculty updated successfully");
        }
        AdminCommand::DeleteFaculty { id } => {
            api.delete_faculty(&id)
                .map_err(notice("Failed to delete faculty"))?;
            println!("Faculty deleted successfully");
        }
        AdminCommand::AddDepartment { name, faculty } => {
            api.create_department(&DepartmentForm { name, faculty })
                .map_err(notice("Failed to save department"))?;
            println!("Department created successfully");
        }
        AdminCommand::UpdateDepartment { id, name, faculty } => {
            let departments = api
                .departments(None)
                .map_err(notice("Failed to load departments"))?;
            let department = departments
                .into_iter()
                .find(|d| d.id == id)
                .ok_or_else(|| anyhow!("No department {id}"))?;
            let form = DepartmentForm {
                name: name.unwrap_or(department.name),
                faculty: faculty.unwrap_or_else(|| department.faculty.id().clone()),
            };
            api.update_department(&id, &form)
                .map_err(notice("Failed to save department"))?;
            println!("Department updated successfully");
        }
        AdminCommand::DeleteDepartment { id } => {
            api.delete_department(&id)
                .map_err(notice("Failed to delete department"))?;
            println!("Department deleted successfully");
        }
    }
    Ok(())
}

fn execute(session: &mut Client, command: Command) -> anyhow::Result<()> {
    match command {
        Command::Login { matric, password } => login(session, matric, password)?,
        Command::Register {
            first_name,
            last_name,
            matric,
            email,
            password,
            confirm_password,
            faculty,
            department,
            image,
        } => {
            let registration = Registration {
                first_name,
                last_name,
                matric_number: matric,
                email,
                password,
                confirm_password,
                faculty,
                department,
                profile_image: image,
            };
            session
                .register(&registration)
                .map_err(notice("Registration failed"))?;
            println!("Registration successful! Please login.");
        }
        Command::Logout => {
            session.logout()?;
            println!("Logged out successfully");
        }
        Command::Whoami => match session.current_user() {
            Some(user) => print_user(user),
            None => println!("Not logged in"),
        },
        Command::Navigate { path } => {
            let route = Route::parse(&path);
            match guard::check(session.state(), route.required_role()) {
                Guard::Render => println!("{route}"),
                Guard::Redirect(to) => println!("{route} -> {to}"),
                Guard::Loading => println!("{route} (loading)"),
            }
        }
        Command::Profile {
            first_name,
            last_name,
            email,
            faculty,
            department,
            image,
        } => {
            let update = ProfileUpdate {
                first_name,
                last_name,
                email,
                faculty,
                department,
                profile_image: image,
            };
            if update.is_empty() {
                if let Some(user) = session.current_user() {
                    print_user(user);
                }
            } else {
                session
                    .update_profile(&update)
                    .map_err(notice("Failed to update profile"))?;
                println!("Profile updated successfully");
            }
        }
        Command::Dashboard => {
            let user = session
                .current_user()
                .ok_or_else(|| anyhow!("Not logged in"))?;
            show_dashboard(session.api(), user)?;
        }
        Command::Elections => {
            let listing = ElectionListing::load(session.api())
                .map_err(notice("Failed to load elections. Please try again."))?;
            for (heading, elections) in listing.groups() {
                println!("{heading}:");
                print_elections(elections);
            }
        }
        Command::Vote { election, choices } => vote(session.api(), election, choices)?,
        Command::Results { election, charts } => results(session.api(), election, charts)?,
        Command::Faculties => {
            let faculties = session
                .api()
                .faculties()
                .map_err(notice("Failed to load faculties"))?;
            for faculty in faculties {
                println!("  {}  {}", faculty.id, faculty.name);
            }
        }
        Command::Departments { faculty } => list_departments(session.api(), faculty.as_ref())?,
        Command::Admin { command } => admin(session.api(), command)?,
    }
    Ok(())
}

fn run() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = Config::load()?;
    if let Some(api_url) = args.api_url {
        config = config.with_api_url(api_url)?;
    }
    logging::init(config.log_config())?;
    if args.quiet {
        logging::silence_requests();
    }
    info!("Using API at {}", config.api_url());

    let tokens = FileTokenStore::new(config.token_path());
    let mut session = Session::new(HttpClient::new(&config, tokens)?);
    session.initialize();

    if let Some(route) = args.command.route() {
        enter(&session, &route)?;
    }
    execute(&mut session, args.command)
}

fn main() {
    if let Err(e) = run() {
        eprintln!("FATAL: {}", e);
        process::exit(1);
    }
}
