//! Runs ledger jobs off the UI thread.
//!
//! Every dispatched job gets its own thread so independent actions proceed
//! concurrently. Results come back over a channel the UI loop drains. A job
//! that never finishes, because its thread could not start or because it
//! panicked, still reports back through [`Job::aborted`].

use crate::domain::LedgerClient;
use crossbeam_channel::{unbounded, Receiver, Sender};
use std::io;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread;
use tracing::error;

/// A unit of work that talks to the ledger client.
pub trait Job: Send + 'static {
    type Output: Send + 'static;
    /// What is left of a job once it has been handed to its thread; enough
    /// to describe the job in an [`Job::aborted`] output.
    type Ticket: Clone + Send + 'static;

    fn ticket(&self) -> Self::Ticket;

    fn run(self, client: &dyn LedgerClient) -> Self::Output;

    /// Output reported in place of [`Job::run`] when the job did not run to
    /// completion.
    fn aborted(ticket: Self::Ticket, reason: String) -> Self::Output;
}

type Task = Box<dyn FnOnce() + Send>;

pub struct Dispatcher<J: Job> {
    client: Arc<dyn LedgerClient>,
    tx: Sender<J::Output>,
    rx: Receiver<J::Output>,
}

impl<J: Job> Dispatcher<J> {
    pub fn new(client: Arc<dyn LedgerClient>) -> Self {
        let (tx, rx) = unbounded();
        Self { client, tx, rx }
    }

    pub fn dispatch(&self, job: J) {
        self.launch(job, |task| {
            thread::Builder::new()
                .name("ledger-job".into())
                .spawn(task)
                .map(|_| ())
        });
    }

    fn launch<S>(&self, job: J, spawn: S)
    where
        S: FnOnce(Task) -> io::Result<()>,
    {
        let ticket = job.ticket();
        let panic_ticket = ticket.clone();
        let client = Arc::clone(&self.client);
        let tx = self.tx.clone();

        let task: Task = Box::new(move || {
            let output = panic::catch_unwind(AssertUnwindSafe(|| job.run(client.as_ref())))
                .unwrap_or_else(|_| {
                    error!("ledger job panicked");
                    J::aborted(panic_ticket, "the request was interrupted".into())
                });
            // the receiver lives as long as the dispatcher
            let _ = tx.send(output);
        });

        if let Err(e) = spawn(task) {
            error!("failed to spawn ledger job thread: {e}");
            let _ = self
                .tx
                .send(J::aborted(ticket, format!("could not start the request: {e}")));
        }
    }

    /// Outputs of every job that finished since the last call.
    pub fn drain(&self) -> Vec<J::Output> {
        self.rx.try_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Account, ClientResult, SendStatus, SendTransactionResponse};
    use std::time::Duration;

    struct StaticClient;

    impl LedgerClient for StaticClient {
        fn fund(&self, _account_id: &str) -> ClientResult<()> {
            Ok(())
        }

        fn get_account(&self, account_id: &str) -> ClientResult<Account> {
            Ok(Account { account_id: account_id.to_string(), sequence: 7 })
        }

        fn send_transaction(&self, _envelope_xdr: &str) -> ClientResult<SendTransactionResponse> {
            Ok(SendTransactionResponse {
                status: SendStatus::Pending,
                hash: "00".into(),
                error_result_xdr: None,
            })
        }
    }

    struct SequenceJob(&'static str);

    impl Job for SequenceJob {
        type Output = Result<i64, String>;
        type Ticket = &'static str;

        fn ticket(&self) -> &'static str {
            self.0
        }

        fn run(self, client: &dyn LedgerClient) -> Self::Output {
            if self.0 == "panic" {
                panic!("job blew up");
            }
            client.get_account(self.0).map(|a| a.sequence).map_err(|e| e.to_string())
        }

        fn aborted(ticket: &'static str, reason: String) -> Self::Output {
            Err(format!("{ticket}: {reason}"))
        }
    }

    fn next(dispatcher: &Dispatcher<SequenceJob>) -> Result<i64, String> {
        dispatcher
            .rx
            .recv_timeout(Duration::from_secs(5))
            .expect("job did not report back")
    }

    #[test]
    fn test_jobs_report_back() {
        let dispatcher: Dispatcher<SequenceJob> = Dispatcher::new(Arc::new(StaticClient));
        dispatcher.dispatch(SequenceJob("GA"));
        dispatcher.dispatch(SequenceJob("GB"));

        assert_eq!(next(&dispatcher), Ok(7));
        assert_eq!(next(&dispatcher), Ok(7));
        assert!(dispatcher.drain().is_empty());
    }

    #[test]
    fn test_panicking_job_still_reports() {
        let dispatcher: Dispatcher<SequenceJob> = Dispatcher::new(Arc::new(StaticClient));
        dispatcher.dispatch(SequenceJob("panic"));

        let output = next(&dispatcher);
        assert_eq!(output, Err("panic: the request was interrupted".to_string()));
    }

    #[test]
    fn test_spawn_failure_reports_aborted() {
        let dispatcher: Dispatcher<SequenceJob> = Dispatcher::new(Arc::new(StaticClient));
        dispatcher.launch(SequenceJob("GA"), |_task| {
            Err(io::Error::new(io::ErrorKind::OutOfMemory, "no threads left"))
        });

        let outputs = dispatcher.drain();
        assert_eq!(outputs.len(), 1);
        let reason = outputs[0].clone().unwrap_err();
        assert!(reason.starts_with("GA: could not start the request"));
        assert!(reason.contains("no threads left"));
    }
}
