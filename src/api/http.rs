use std::path::Path;
use std::time::Duration;

use reqwest::blocking::{multipart::Form, Client, RequestBuilder, Response};
use reqwest::{Method, Url};
use serde::de::DeserializeOwned;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::logging::{self, RequestId};
use crate::model::{
    AdminDashboard, Candidate, CandidateForm, CandidateResult, Credentials, Department,
    DepartmentForm, Election, ElectionForm, ElectionPhase, Faculty, FacultyForm, Id,
    LoginResponse, ProfileUpdate, Registration, User, UserUpdate, VoteEligibility, VoteRecord,
    VoteRequest,
};
use crate::token::TokenStore;

use super::{AdminApi, AuthApi, DirectoryApi, ElectionApi};

/// Request path as a list of segments. Each segment is percent-encoded on its
/// own when the URL is built.
macro_rules! path {
    ($($segment:expr),+) => {
        [$(AsRef::<str>::as_ref(&$segment)),+]
    };
}

/// Whether a request carries the bearer token.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum Auth {
    Bearer,
    Public,
}

/// Blocking HTTP implementation of every API trait.
pub struct HttpClient {
    client: Client,
    base_url: String,
    tokens: Box<dyn TokenStore>,
}

impl HttpClient {
    pub fn new(config: &Config, tokens: impl TokenStore + 'static) -> Result<Self> {
        // Requests are never timed out client-side.
        let client = Client::builder().timeout(None::<Duration>).build()?;
        Ok(Self {
            client,
            base_url: config.api_url().to_string(),
            tokens: Box::new(tokens),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &[&str]) -> Result<Url> {
        let invalid = || Error::Url(self.base_url.clone());
        let mut url = Url::parse(&self.base_url).map_err(|_| invalid())?;
        url.path_segments_mut()
            .map_err(|_| invalid())?
            .pop_if_empty()
            .extend(path);
        Ok(url)
    }

    /// Send a request, logging it and mapping failures onto [`Error`].
    /// A 401 response forgets the stored token.
    fn execute(
        &self,
        method: Method,
        path: &[&str],
        auth: Auth,
        build: impl FnOnce(RequestBuilder) -> RequestBuilder,
    ) -> Result<Response> {
        let url = self.url(path)?;
        let path = url.path().to_string();
        let mut request = self
            .client
            .request(method.clone(), url)
            .header(reqwest::header::ACCEPT, "application/json");
        if auth == Auth::Bearer {
            if let Some(token) = self.tokens.load()? {
                request = request.bearer_auth(token);
            }
        }
        let request = build(request);

        let id = RequestId::next();
        logging::log_request(id, &method, &path);
        let response = request.send().map_err(|err| {
            logging::log_transport_failure(id, &path, &err);
            err
        })?;
        let status = response.status();
        logging::log_response(id, status, &path);

        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().unwrap_or_default();
        let err = Error::from_response(status, &body);
        if err.is_unauthenticated() {
            log::warn!("Session rejected by the server, clearing stored token");
            self.tokens.clear()?;
        }
        Err(err)
    }

    fn get<T: DeserializeOwned>(&self, path: &[&str], auth: Auth) -> Result<T> {
        Ok(self.execute(Method::GET, path, auth, |r| r)?.json()?)
    }

    fn send_json<B: serde::Serialize + ?Sized>(
        &self,
        method: Method,
        path: &[&str],
        body: &B,
    ) -> Result<Response> {
        self.execute(method, path, Auth::Bearer, |r| r.json(body))
    }

    fn send_multipart(&self, method: Method, path: &[&str], auth: Auth, form: Form) -> Result<Response> {
        self.execute(method, path, auth, |r| r.multipart(form))
    }

    fn delete(&self, path: &[&str]) -> Result<()> {
        self.execute(Method::DELETE, path, Auth::Bearer, |r| r)?;
        Ok(())
    }
}

/// Build a multipart form from text fields and an optional image file.
fn multipart(fields: Vec<(&'static str, String)>, image: Option<&Path>) -> Result<Form> {
    let mut form = fields
        .into_iter()
        .fold(Form::new(), |form, (name, value)| form.text(name, value));
    if let Some(image) = image {
        form = form.file("profileImage", image)?;
    }
    Ok(form)
}

impl AuthApi for HttpClient {
    fn login(&self, credentials: &Credentials) -> Result<LoginResponse> {
        let form = credentials.form();
        Ok(self
            .execute(Method::POST, &path!("auth", "login"), Auth::Public, |r| r.form(&form))?
            .json()?)
    }

    fn register(&self, registration: &Registration) -> Result<()> {
        let form = multipart(
            registration.text_fields(),
            registration.profile_image.as_deref(),
        )?;
        self.send_multipart(Method::POST, &path!("auth", "register"), Auth::Public, form)?;
        Ok(())
    }

    fn me(&self) -> Result<User> {
        self.get(&path!("auth", "me"), Auth::Bearer)
    }

    fn update_profile(&self, update: &ProfileUpdate) -> Result<User> {
        let form = multipart(update.text_fields(), update.profile_image.as_deref())?;
        Ok(self
            .send_multipart(Method::PUT, &path!("users", "profile"), Auth::Bearer, form)?
            .json()?)
    }

    fn tokens(&self) -> &dyn TokenStore {
        &*self.tokens
    }
}

impl ElectionApi for HttpClient {
    fn elections(&self, phase: ElectionPhase) -> Result<Vec<Election>> {
        self.get(&path!("elections", phase.path_segment()), Auth::Bearer)
    }

    fn all_elections(&self) -> Result<Vec<Election>> {
        self.get(&path!("elections"), Auth::Bearer)
    }

    fn election(&self, id: &Id) -> Result<Election> {
        self.get(&path!("elections", id), Auth::Bearer)
    }

    fn candidates(&self, election: &Id) -> Result<Vec<Candidate>> {
        self.get(&path!("candidates", "election", election), Auth::Bearer)
    }

    fn eligibility(&self, election: &Id) -> Result<VoteEligibility> {
        self.get(&path!("votes", "check", election), Auth::Bearer)
    }

    fn cast_vote(&self, vote: &VoteRequest) -> Result<()> {
        self.send_json(Method::POST, &path!("votes"), vote)?;
        Ok(())
    }

    fn results(&self, election: &Id) -> Result<Vec<CandidateResult>> {
        self.get(&path!("elections", election, "results"), Auth::Bearer)
    }

    fn my_votes(&self) -> Result<Vec<VoteRecord>> {
        self.get(&path!("user", "votes"), Auth::Bearer)
    }
}

impl DirectoryApi for HttpClient {
    fn faculties(&self) -> Result<Vec<Faculty>> {
        self.get(&path!("faculties"), Auth::Public)
    }

    fn departments(&self, faculty: Option<&Id>) -> Result<Vec<Department>> {
        match faculty {
            Some(faculty) => Ok(self
                .execute(Method::GET, &path!("departments"), Auth::Public, |r| {
                    r.query(&[("faculty", faculty.as_str())])
                })?
                .json()?),
            None => self.get(&path!("departments"), Auth::Public),
        }
    }
}

impl AdminApi for HttpClient {
    fn dashboard(&self) -> Result<AdminDashboard> {
        self.get(&path!("admin", "dashboard"), Auth::Bearer)
    }

    fn admin_elections(&self, phase: Option<ElectionPhase>) -> Result<Vec<Election>> {
        match phase {
            Some(phase) => self.get(
                &path!("admin", "elections", phase.path_segment()),
                Auth::Bearer,
            ),
            None => self.get(&path!("admin", "elections"), Auth::Bearer),
        }
    }

    fn admin_all_elections(&self) -> Result<Vec<Election>> {
        self.get(&path!("admin", "all-elections"), Auth::Bearer)
    }

    fn create_election(&self, form: &ElectionForm) -> Result<()> {
        self.send_json(Method::POST, &path!("admin", "elections"), form)?;
        Ok(())
    }

    fn update_election(&self, id: &Id, form: &ElectionForm) -> Result<()> {
        self.send_json(Method::PUT, &path!("admin", "elections", id), form)?;
        Ok(())
    }

    fn delete_election(&self, id: &Id) -> Result<()> {
        self.delete(&path!("admin", "elections", id))
    }

    fn create_candidate(&self, form: &CandidateForm) -> Result<()> {
        let body = multipart(form.text_fields(), form.profile_image.as_deref())?;
        self.send_multipart(Method::POST, &path!("admin", "candidates"), Auth::Bearer, body)?;
        Ok(())
    }

    fn update_candidate(&self, id: &Id, form: &CandidateForm) -> Result<()> {
        let body = multipart(form.text_fields(), form.profile_image.as_deref())?;
        self.send_multipart(
            Method::PUT,
            &path!("admin", "candidates", id),
            Auth::Bearer,
            body,
        )?;
        Ok(())
    }

    fn delete_candidate(&self, id: &Id) -> Result<()> {
        self.delete(&path!("admin", "candidates", id))
    }

    fn users(&self) -> Result<Vec<User>> {
        self.get(&path!("admin", "users"), Auth::Bearer)
    }

    fn update_user(&self, id: &Id, update: &UserUpdate) -> Result<()> {
        self.send_json(Method::PUT, &path!("admin", "users", id), update)?;
        Ok(())
    }

    fn delete_user(&self, id: &Id) -> Result<()> {
        self.delete(&path!("admin", "users", id))
    }

    fn create_faculty(&self, form: &FacultyForm) -> Result<()> {
        self.send_json(Method::POST, &path!("admin", "faculties"), form)?;
        Ok(())
    }

    fn update_faculty(&self, id: &Id, form: &FacultyForm) -> Result<()> {
        self.send_json(Method::PUT, &path!("admin", "faculties", id), form)?;
        Ok(())
    }

    fn delete_faculty(&self, id: &Id) -> Result<()> {
        self.delete(&path!("admin", "faculties", id))
    }

    fn create_department(&self, form: &DepartmentForm) -> Result<()> {
        self.send_json(Method::POST, &path!("admin", "departments"), form)?;
        Ok(())
    }

    fn update_department(&self, id: &Id, form: &DepartmentForm) -> Result<()> {
        self.send_json(Method::PUT, &path!("admin", "departments", id), form)?;
        Ok(())
    }

    fn delete_department(&self, id: &Id) -> Result<()> {
        self.delete(&path!("admin", "departments", id))
    }
}

#[cfg(test)]
mod tests {
    use std::io::{BufRead, BufReader, Read, Write};
    use std::net::{TcpListener, TcpStream};
    use std::thread::{self, JoinHandle};

    use reqwest::StatusCode;

    use super::*;
    use crate::token::MemoryTokenStore;

    fn stub_client(base_url: &str, tokens: MemoryTokenStore) -> HttpClient {
        HttpClient {
            // Talk to the local stub directly, whatever proxy the environment sets.
            client: Client::builder().no_proxy().build().unwrap(),
            base_url: base_url.to_string(),
            tokens: Box::new(tokens),
        }
    }

    /// Answer one connection per canned `(status, body)` and hand back each
    /// raw request: head with lowercased header names, a blank line, then the body.
    fn stub(replies: Vec<(u16, &'static str)>) -> (String, JoinHandle<Vec<String>>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());
        let server = thread::spawn(move || {
            replies
                .into_iter()
                .map(|(status, body)| {
                    let (mut stream, _) = listener.accept().unwrap();
                    let request = read_request(&mut stream);
                    write!(
                        stream,
                        "HTTP/1.1 {status} Stub\r\nContent-Type: application/json\r\n\
                         Content-Length: {}\r\nConnection: close\r\n\r\n{body}",
                        body.len()
                    )
                    .unwrap();
                    request
                })
                .collect()
        });
        (base_url, server)
    }

    fn read_request(stream: &mut TcpStream) -> String {
        let mut reader = BufReader::new(stream);
        let mut head = String::new();
        let mut length = 0;
        loop {
            let mut line = String::new();
            reader.read_line(&mut line).unwrap();
            if line.trim_end().is_empty() {
                break;
            }
            let line = match line.split_once(':') {
                Some((name, value)) => format!("{}:{}", name.to_lowercase(), value),
                None => line,
            };
            if let Some(value) = line.strip_prefix("content-length:") {
                length = value.trim().parse().unwrap();
            }
            head.push_str(&line);
        }
        let mut body = vec![0; length];
        reader.read_exact(&mut body).unwrap();
        format!("{head}\r\n{}", String::from_utf8_lossy(&body))
    }

    #[test]
    fn segments_are_encoded() {
        let client = stub_client("http://localhost:8000", MemoryTokenStore::default());
        let id = Id::from("64f0");
        assert_eq!(
            client.url(&path!("elections", id, "results")).unwrap().as_str(),
            "http://localhost:8000/elections/64f0/results"
        );
        let hostile = Id::from("../admin/users?x#y");
        assert_eq!(
            client.url(&path!("elections", hostile)).unwrap().path(),
            "/elections/..%2Fadmin%2Fusers%3Fx%23y"
        );
        let nested = stub_client("http://localhost:8000/api", MemoryTokenStore::default());
        assert_eq!(
            nested
                .url(&path!("admin", "elections", ElectionPhase::Completed.path_segment()))
                .unwrap()
                .path(),
            "/api/admin/elections/completed"
        );
    }

    #[test]
    fn base_url_comes_from_config() {
        let config = Config::default()
            .with_api_url("http://localhost:8000/")
            .unwrap();
        let client = HttpClient::new(&config, MemoryTokenStore::default()).unwrap();
        assert_eq!(client.base_url(), "http://localhost:8000");
    }

    #[test]
    fn bearer_token_is_attached() {
        let (base_url, server) = stub(vec![(200, "[]"), (200, "[]")]);
        let client = stub_client(&base_url, MemoryTokenStore::with_token("t0k3n"));

        assert!(client.all_elections().unwrap().is_empty());
        assert!(client.faculties().unwrap().is_empty());

        let requests = server.join().unwrap();
        assert!(requests[0].starts_with("GET /elections HTTP/1.1"));
        assert!(requests[0].contains("authorization: Bearer t0k3n"));
        assert!(requests[0].contains("accept: application/json"));
        // Directory listings are public.
        assert!(requests[1].starts_with("GET /faculties HTTP/1.1"));
        assert!(!requests[1].contains("authorization:"));
    }

    #[test]
    fn unauthorized_clears_token() {
        let (base_url, server) = stub(vec![(401, r#"{"detail": "Could not validate credentials"}"#)]);
        let client = stub_client(&base_url, MemoryTokenStore::with_token("stale"));

        let err = client.me().unwrap_err();
        assert!(matches!(&err, Error::Unauthenticated(m) if m == "Could not validate credentials"));
        assert_eq!(client.tokens().load().unwrap(), None);
        assert!(server.join().unwrap()[0].contains("authorization: Bearer stale"));
    }

    #[test]
    fn other_failures_keep_token() {
        let (base_url, server) = stub(vec![(403, "")]);
        let client = stub_client(&base_url, MemoryTokenStore::with_token("t"));
        assert!(matches!(client.dashboard(), Err(Error::Forbidden(_))));
        assert_eq!(client.tokens().load().unwrap().as_deref(), Some("t"));
        server.join().unwrap();
    }

    #[test]
    fn login_is_form_encoded() {
        let (base_url, server) = stub(vec![(200, r#"{"access_token": "abc", "token_type": "bearer"}"#)]);
        let client = stub_client(&base_url, MemoryTokenStore::with_token("old"));
        let credentials = Credentials {
            matric_number: "CSC/2021/001".to_string(),
            password: "hunter22".to_string(),
        };

        assert_eq!(client.login(&credentials).unwrap().access_token, "abc");

        let request = &server.join().unwrap()[0];
        assert!(request.starts_with("POST /auth/login HTTP/1.1"));
        assert!(request.contains("content-type: application/x-www-form-urlencoded"));
        assert!(!request.contains("authorization:"));
        let body = request.rsplit("\r\n").next().unwrap();
        assert_eq!(
            body,
            "grant_type=password&username=CSC%2F2021%2F001&password=hunter22"
        );
    }

    #[test]
    fn rejection_bodies_are_mapped() {
        let (base_url, server) = stub(vec![
            (409, r#"{"message": "You have already voted for this position"}"#),
            (409, ""),
            (502, "<html>Bad Gateway</html>"),
        ]);
        let client = stub_client(&base_url, MemoryTokenStore::with_token("t"));
        let vote = VoteRequest {
            election_id: Id::from("e1"),
            candidate_id: Id::from("c1"),
        };

        let err = client.cast_vote(&vote).unwrap_err();
        assert_eq!(err.status(), Some(StatusCode::CONFLICT));
        assert_eq!(err.server_message(), Some("You have already voted for this position"));

        let err = client.cast_vote(&vote).unwrap_err();
        assert_eq!(err.server_message(), None);
        assert_eq!(err.user_message("Failed to submit your vote"), "Failed to submit your vote");

        let err = client.all_elections().unwrap_err();
        assert!(matches!(err, Error::Server { status: StatusCode::BAD_GATEWAY, message: None }));

        let requests = server.join().unwrap();
        assert!(requests[0].starts_with("POST /votes HTTP/1.1"));
        assert!(requests[0].contains("content-type: application/json"));
        assert!(requests[0].ends_with(r#"{"electionId":"e1","candidateId":"c1"}"#));
    }

    #[test]
    fn multipart_requires_readable_image() {
        let err = multipart(
            vec![("firstName", "Ada".to_string())],
            Some(Path::new("/definitely/not/here.png")),
        )
        .unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }
}
