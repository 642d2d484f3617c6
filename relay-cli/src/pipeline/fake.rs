//! Scripted [`ActionsApi`] for exercising pipeline stages without a server

use std::collections::VecDeque;
use std::io::Write;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use relay_client::{ActionsApi, ClientError, Result};
use relay_core::domain::repository::Repository;
use relay_core::dto::dispatch::DispatchRequest;
use relay_core::dto::run::{RepositoryRef, RunFilter, User, WorkflowRun};

pub const LOGS_URL: &str = "https://blobs.example.com/logs.zip";

/// Responses are consumed in order. An exhausted listing script answers with
/// an empty listing; an exhausted run script repeats its last run. A hanging
/// fake never answers a listing call.
pub struct FakeActions {
    login: String,
    dispatch_error: Mutex<Option<ClientError>>,
    listings: Mutex<VecDeque<Result<Vec<WorkflowRun>>>>,
    runs: Mutex<VecDeque<Result<WorkflowRun>>>,
    last_run: Mutex<Option<WorkflowRun>>,
    archive: Vec<u8>,
    hang_listings: bool,
    dispatched: Mutex<Vec<DispatchRequest>>,
    list_filters: Mutex<Vec<(Option<String>, Option<String>)>>,
    requested_attempts: Mutex<Vec<u32>>,
    list_calls: AtomicUsize,
    get_calls: AtomicUsize,
    download_calls: AtomicUsize,
}

impl FakeActions {
    pub fn new(login: &str) -> Self {
        Self {
            login: login.to_string(),
            dispatch_error: Mutex::new(None),
            listings: Mutex::new(VecDeque::new()),
            runs: Mutex::new(VecDeque::new()),
            last_run: Mutex::new(None),
            archive: Vec::new(),
            hang_listings: false,
            dispatched: Mutex::new(Vec::new()),
            list_filters: Mutex::new(Vec::new()),
            requested_attempts: Mutex::new(Vec::new()),
            list_calls: AtomicUsize::new(0),
            get_calls: AtomicUsize::new(0),
            download_calls: AtomicUsize::new(0),
        }
    }

    pub fn with_listing(self, listing: Result<Vec<WorkflowRun>>) -> Self {
        self.listings.lock().unwrap().push_back(listing);
        self
    }

    pub fn with_run(self, run: Result<WorkflowRun>) -> Self {
        self.runs.lock().unwrap().push_back(run);
        self
    }

    pub fn with_archive(mut self, archive: Vec<u8>) -> Self {
        self.archive = archive;
        self
    }

    pub fn hanging_listings(mut self) -> Self {
        self.hang_listings = true;
        self
    }

    pub fn failing_dispatch(self, err: ClientError) -> Self {
        *self.dispatch_error.lock().unwrap() = Some(err);
        self
    }

    pub fn dispatched(&self) -> Vec<DispatchRequest> {
        self.dispatched.lock().unwrap().clone()
    }

    pub fn list_filters(&self) -> Vec<(Option<String>, Option<String>)> {
        self.list_filters.lock().unwrap().clone()
    }

    pub fn requested_attempts(&self) -> Vec<u32> {
        self.requested_attempts.lock().unwrap().clone()
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn get_calls(&self) -> usize {
        self.get_calls.load(Ordering::SeqCst)
    }

    pub fn download_calls(&self) -> usize {
        self.download_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ActionsApi for FakeActions {
    async fn authenticated_user(&self) -> Result<User> {
        Ok(User {
            login: self.login.clone(),
        })
    }

    async fn dispatch(&self, _repo: &Repository, request: &DispatchRequest) -> Result<()> {
        if let Some(err) = self.dispatch_error.lock().unwrap().take() {
            return Err(err);
        }
        self.dispatched.lock().unwrap().push(request.clone());
        Ok(())
    }

    async fn list_workflow_runs(
        &self,
        _repo: &Repository,
        _workflow: &str,
        filter: &RunFilter,
    ) -> Result<Vec<WorkflowRun>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        self.list_filters
            .lock()
            .unwrap()
            .push((filter.actor.clone(), filter.event.clone()));
        if self.hang_listings {
            std::future::pending::<()>().await;
        }
        self.listings
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(Vec::new()))
    }

    async fn get_workflow_run(&self, _repo: &Repository, run_id: u64) -> Result<WorkflowRun> {
        self.get_calls.fetch_add(1, Ordering::SeqCst);
        let next = self.runs.lock().unwrap().pop_front();
        match next {
            Some(Ok(run)) => {
                *self.last_run.lock().unwrap() = Some(run.clone());
                Ok(run)
            }
            Some(Err(err)) => Err(err),
            None => self
                .last_run
                .lock()
                .unwrap()
                .clone()
                .ok_or_else(|| ClientError::api_error(404, format!("no run {}", run_id))),
        }
    }

    async fn run_attempt_logs_url(
        &self,
        _repo: &Repository,
        _run_id: u64,
        attempt: u32,
    ) -> Result<String> {
        self.requested_attempts.lock().unwrap().push(attempt);
        Ok(LOGS_URL.to_string())
    }

    async fn download_logs(&self, url: &str) -> Result<Vec<u8>> {
        self.download_calls.fetch_add(1, Ordering::SeqCst);
        assert_eq!(url, LOGS_URL);
        Ok(self.archive.clone())
    }
}

/// A run as the API would report it
pub fn workflow_run(id: u64, title: &str, status: &str, conclusion: Option<&str>) -> WorkflowRun {
    WorkflowRun {
        id,
        name: Some("dispatch".to_string()),
        display_title: Some(title.to_string()),
        status: Some(status.to_string()),
        conclusion: conclusion.map(str::to_string),
        run_attempt: Some(1),
        html_url: None,
        repository: Some(RepositoryRef {
            full_name: "octo/ci".to_string(),
            html_url: "https://github.com/octo/ci".to_string(),
        }),
    }
}

/// Zip bundle holding `entries`
pub fn archive(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(std::io::Cursor::new(Vec::new()));
    let options = zip::write::SimpleFileOptions::default();
    for (name, contents) in entries {
        writer.start_file(*name, options).unwrap();
        writer.write_all(contents).unwrap();
    }
    writer.finish().unwrap().into_inner()
}
