//! Background consumer of logo jobs.

use std::time::Duration;

use fit_config::LogoConfig;
use fit_core::jobs::LogoJob;
use fit_db::logo_jobs::LogoJobReceiver;
use fit_db::service::FitService;
use tokio::task::JoinHandle;

use crate::client::LogoFetcher;
use crate::error::LogoError;

/// Counters reported when the worker exits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorkerStats {
    pub processed: u32,
    /// Jobs whose outcome (logo or no logo) was written back.
    pub stored: u32,
    pub failed: u32,
}

pub struct LogoWorker<F> {
    fetcher: F,
    service: FitService,
    max_attempts: u32,
    backoff: Duration,
}

impl<F: LogoFetcher> LogoWorker<F> {
    /// `service` should be a handle without a dispatcher attached, otherwise
    /// the worker keeps its own queue open.
    pub fn new(fetcher: F, service: FitService, config: &LogoConfig) -> Self {
        Self {
            fetcher,
            service,
            max_attempts: config.max_attempts.max(1),
            backoff: config.backoff(),
        }
    }

    /// Drain jobs until every dispatcher is dropped.
    pub async fn run(self, mut jobs: LogoJobReceiver) -> WorkerStats {
        let mut stats = WorkerStats::default();
        while let Some(job) = jobs.recv().await {
            stats.processed += 1;
            match self.process(&job).await {
                Ok(()) => stats.stored += 1,
                Err(e) => {
                    stats.failed += 1;
                    tracing::warn!(
                        company_id = %job.company_id,
                        company = %job.company_name,
                        error = %e,
                        "logo lookup abandoned"
                    );
                }
            }
        }
        tracing::debug!(?stats, "logo worker stopped");
        stats
    }

    /// Fetch with retry, then write the result back to the company row.
    ///
    /// # Errors
    ///
    /// Returns the last fetch error once attempts are exhausted or the error
    /// is not retryable, or the database error from the write-back.
    pub async fn process(&self, job: &LogoJob) -> Result<(), LogoError> {
        let logo_url = self.fetch_with_retry(job).await?;
        self.service
            .set_company_logo(&job.company_id, logo_url.as_deref())
            .await?;
        tracing::info!(
            company_id = %job.company_id,
            found = logo_url.is_some(),
            "company logo resolved"
        );
        Ok(())
    }

    async fn fetch_with_retry(&self, job: &LogoJob) -> Result<Option<String>, LogoError> {
        let mut attempt = 1;
        loop {
            match self.fetcher.fetch_logo(job).await {
                Ok(url) => return Ok(url),
                Err(e) if attempt < self.max_attempts && e.is_retryable() => {
                    let delay = retry_delay(self.backoff, attempt, &e);
                    tracing::debug!(
                        company_id = %job.company_id,
                        attempt,
                        ?delay,
                        error = %e,
                        "retrying logo lookup"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

/// Exponential backoff, stretched to the server's `Retry-After` when rate limited.
fn retry_delay(backoff: Duration, attempt: u32, error: &LogoError) -> Duration {
    let exponential = backoff.saturating_mul(2u32.saturating_pow(attempt.saturating_sub(1)));
    match error {
        LogoError::RateLimited { retry_after_secs } => {
            exponential.max(Duration::from_secs(*retry_after_secs))
        }
        _ => exponential,
    }
}

impl<F: LogoFetcher + 'static> LogoWorker<F> {
    /// Run the worker on the tokio runtime.
    pub fn spawn(self, jobs: LogoJobReceiver) -> JoinHandle<WorkerStats> {
        tokio::spawn(self.run(jobs))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicU32, Ordering};

    use fit_core::enums::CompanySize;
    use fit_db::logo_jobs::logo_channel;
    use pretty_assertions::assert_eq;

    use super::*;

    /// Replays scripted outcomes; once exhausted, answers with `fallback`.
    struct ScriptedFetcher {
        script: Mutex<VecDeque<Result<Option<String>, LogoError>>>,
        fallback: Option<String>,
        calls: AtomicU32,
    }

    impl ScriptedFetcher {
        fn new(script: Vec<Result<Option<String>, LogoError>>, fallback: Option<&str>) -> Self {
            Self {
                script: Mutex::new(script.into()),
                fallback: fallback.map(String::from),
                calls: AtomicU32::new(0),
            }
        }

        fn calls(&self) -> u32 {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl LogoFetcher for ScriptedFetcher {
        async fn fetch_logo(&self, _job: &LogoJob) -> Result<Option<String>, LogoError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let next = self.script.lock().unwrap().pop_front();
            next.unwrap_or_else(|| Ok(self.fallback.clone()))
        }
    }

    fn server_error() -> LogoError {
        LogoError::Api {
            status: 503,
            message: "unavailable".into(),
        }
    }

    fn config(max_attempts: u32) -> LogoConfig {
        LogoConfig {
            endpoint: "http://logos.invalid".into(),
            max_attempts,
            backoff_ms: 1,
            ..LogoConfig::default()
        }
    }

    async fn service_with_company(name: &str) -> (FitService, LogoJob) {
        let svc = FitService::new_local(":memory:").await.unwrap();
        let company = svc
            .create_company(name, "logistics", CompanySize::Large)
            .await
            .unwrap();
        let job = LogoJob {
            company_id: company.id,
            company_name: company.name,
        };
        (svc, job)
    }

    #[tokio::test]
    async fn retries_transient_failures_then_stores_logo() {
        let (svc, job) = service_with_company("Acme").await;
        let fetcher = ScriptedFetcher::new(
            vec![Err(server_error()), Err(server_error())],
            Some("https://cdn.example/acme.png"),
        );
        let worker = LogoWorker::new(fetcher, svc.detached_handle(), &config(3));

        worker.process(&job).await.unwrap();
        assert_eq!(worker.fetcher.calls(), 3);

        let company = svc.get_company(&job.company_id).await.unwrap().unwrap();
        assert_eq!(company.logo_url.as_deref(), Some("https://cdn.example/acme.png"));
    }

    #[tokio::test]
    async fn gives_up_after_max_attempts() {
        let (svc, job) = service_with_company("Acme").await;
        let fetcher = ScriptedFetcher::new(
            vec![Err(server_error()), Err(server_error()), Err(server_error())],
            None,
        );
        let worker = LogoWorker::new(fetcher, svc.detached_handle(), &config(2));

        let err = worker.process(&job).await.unwrap_err();
        assert!(matches!(err, LogoError::Api { status: 503, .. }));
        assert_eq!(worker.fetcher.calls(), 2);

        let company = svc.get_company(&job.company_id).await.unwrap().unwrap();
        assert!(company.logo_fetched_at.is_none());
    }

    #[tokio::test]
    async fn non_retryable_error_stops_immediately() {
        let (svc, job) = service_with_company("Acme").await;
        let fetcher = ScriptedFetcher::new(vec![Err(LogoError::Parse("bad json".into()))], None);
        let worker = LogoWorker::new(fetcher, svc.detached_handle(), &config(5));

        assert!(worker.process(&job).await.is_err());
        assert_eq!(worker.fetcher.calls(), 1);
    }

    #[tokio::test]
    async fn no_logo_is_still_recorded() {
        let (svc, job) = service_with_company("Nobody Inc").await;
        let worker = LogoWorker::new(
            ScriptedFetcher::new(vec![], None),
            svc.detached_handle(),
            &config(3),
        );

        worker.process(&job).await.unwrap();
        let company = svc.get_company(&job.company_id).await.unwrap().unwrap();
        assert!(company.logo_url.is_none());
        assert!(company.logo_fetched_at.is_some());
    }

    #[tokio::test]
    async fn run_drains_queue_and_exits_when_closed() {
        let (svc, job) = service_with_company("Acme").await;
        let (dispatcher, rx) = logo_channel();
        dispatcher.dispatch(job.clone());
        dispatcher.dispatch(LogoJob {
            company_id: "cmp-missing0".into(),
            company_name: "Ghost".into(),
        });
        drop(dispatcher);

        let worker = LogoWorker::new(
            ScriptedFetcher::new(vec![], Some("https://cdn.example/a.png")),
            svc.detached_handle(),
            &config(1),
        );
        let stats = worker.spawn(rx).await.unwrap();

        assert_eq!(
            stats,
            WorkerStats {
                processed: 2,
                stored: 1,
                failed: 1,
            }
        );
    }

    #[test]
    fn rate_limit_delay_honours_retry_after() {
        let backoff = Duration::from_millis(100);
        let limited = LogoError::RateLimited { retry_after_secs: 2 };
        assert_eq!(retry_delay(backoff, 1, &limited), Duration::from_secs(2));
        assert_eq!(retry_delay(backoff, 1, &server_error()), Duration::from_millis(100));
        assert_eq!(retry_delay(backoff, 3, &server_error()), Duration::from_millis(400));
    }
}
