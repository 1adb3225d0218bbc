//! CloudConvert job API client.

use std::time::Instant;

use async_trait::async_trait;
use reqwest::{multipart, Client, Response};
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use crate::conversion::TargetFormat;
use crate::metrics::{JOB_SERVICE_DURATION, JOB_SERVICE_REQUESTS};

use super::config::JobServiceConfig;
use super::poll::{poll_until, Backoff, Deadline};
use super::types::{
    input_format_for, job_request, DataEnvelope, Job, Status, Task, OP_EXPORT_URL,
    OP_IMPORT_UPLOAD,
};
use super::{DocumentConverter, JobServiceError};

/// Client for the CloudConvert v2 job API.
pub struct CloudConvertClient {
    client: Client,
    config: JobServiceConfig,
    api_key: String,
}

impl CloudConvertClient {
    /// Create a client. Fails with `NotConfigured` when no API key is set.
    pub fn new(config: JobServiceConfig) -> Result<Self, JobServiceError> {
        let api_key = config
            .api_key()
            .ok_or_else(|| {
                JobServiceError::NotConfigured("job service API key is required".to_string())
            })?
            .to_string();

        let client = Client::builder().timeout(config.request_timeout()).build()?;

        Ok(Self {
            client,
            config,
            api_key,
        })
    }

    fn api_url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }

    /// Create the upload, convert, export job.
    pub async fn create_job(
        &self,
        input_format: &str,
        output_format: TargetFormat,
    ) -> Result<Job, JobServiceError> {
        let body = job_request(input_format, output_format.as_str(), &self.config.engine);
        debug!(
            "Creating conversion job: {} -> {} ({})",
            input_format, output_format, self.config.engine
        );

        let response = self
            .client
            .post(self.api_url("/v2/jobs"))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let envelope: DataEnvelope<Job> = parse_json(check_status(response).await?).await?;
        Ok(envelope.data)
    }

    /// Upload the input file through the import task's form.
    pub async fn upload(
        &self,
        import_task: &Task,
        bytes: &[u8],
        file_name: &str,
    ) -> Result<(), JobServiceError> {
        let form_spec = import_task
            .result
            .as_ref()
            .and_then(|r| r.form.as_ref())
            .ok_or_else(|| {
                JobServiceError::ProtocolViolation(format!(
                    "import task {} has no upload form",
                    import_task.id
                ))
            })?;

        let mut form = multipart::Form::new();
        for (key, value) in &form_spec.parameters {
            let value = value
                .as_str()
                .map(str::to_string)
                .unwrap_or_else(|| value.to_string());
            form = form.text(key.clone(), value);
        }
        form = form.part(
            "file",
            multipart::Part::bytes(bytes.to_vec()).file_name(file_name.to_string()),
        );

        debug!("Uploading {} ({} bytes) to import task {}", file_name, bytes.len(), import_task.id);

        let response = self
            .client
            .post(&form_spec.url)
            .multipart(form)
            .send()
            .await?;
        check_status(response).await?;
        Ok(())
    }

    pub async fn get_job(&self, job_id: &str) -> Result<Job, JobServiceError> {
        let response = self
            .client
            .get(self.api_url(&format!("/v2/jobs/{}", job_id)))
            .bearer_auth(&self.api_key)
            .send()
            .await?;
        let envelope: DataEnvelope<Job> = parse_json(check_status(response).await?).await?;
        Ok(envelope.data)
    }

    pub async fn get_task(&self, task_id: &str) -> Result<Task, JobServiceError> {
        let response = self
            .client
            .get(self.api_url(&format!("/v2/tasks/{}", task_id)))
            .bearer_auth(&self.api_key)
            .send()
            .await?;
        let envelope: DataEnvelope<Task> = parse_json(check_status(response).await?).await?;
        Ok(envelope.data)
    }

    /// Poll the job until it is finished or failed.
    pub async fn wait_for_job(
        &self,
        job_id: &str,
        deadline: &Deadline,
    ) -> Result<Job, JobServiceError> {
        poll_until(
            &format!("job {}", job_id),
            &self.config.poll,
            deadline,
            || self.get_job(job_id),
            |job: &Job| job.status.is_terminal(),
        )
        .await
    }

    /// Poll a single task until it is finished or failed.
    pub async fn wait_for_task(
        &self,
        task_id: &str,
        deadline: &Deadline,
    ) -> Result<Task, JobServiceError> {
        poll_until(
            &format!("task {}", task_id),
            &self.config.poll,
            deadline,
            || self.get_task(task_id),
            |task: &Task| task.status.is_terminal(),
        )
        .await
    }

    /// Fetch the converted file.
    pub async fn download(&self, url: &str) -> Result<Vec<u8>, JobServiceError> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(JobServiceError::DownloadFailed {
                status: status.as_u16(),
            });
        }
        Ok(response.bytes().await?.to_vec())
    }

    /// One full pass of the job protocol.
    async fn run_job(
        &self,
        bytes: &[u8],
        file_name: &str,
        output_format: TargetFormat,
    ) -> Result<Vec<u8>, JobServiceError> {
        let input_format = input_format_for(file_name);

        let job = observe("create", self.create_job(&input_format, output_format)).await?;
        info!("Created conversion job {} for {}", job.id, file_name);

        let import_task = job.task_by_operation(OP_IMPORT_UPLOAD).ok_or_else(|| {
            JobServiceError::ProtocolViolation(format!("job {} has no import task", job.id))
        })?;
        observe("upload", self.upload(import_task, bytes, file_name)).await?;

        // Both waits draw on one budget.
        let deadline = Deadline::after(self.config.wait_timeout());
        let job = observe("wait", self.wait_for_job(&job.id, &deadline)).await?;
        if job.status == Status::Error {
            return Err(JobServiceError::JobFailed(job.failure_summary()));
        }

        let export_task = job.task_by_operation(OP_EXPORT_URL).ok_or_else(|| {
            JobServiceError::ProtocolViolation(format!("job {} has no export task", job.id))
        })?;

        // The job can report finished before the export task carries its result.
        let export_task =
            observe("export", self.wait_for_task(&export_task.id, &deadline)).await?;
        if export_task.status == Status::Error {
            return Err(JobServiceError::JobFailed(export_task.failure_description()));
        }

        let url = export_task
            .first_file_url()
            .ok_or(JobServiceError::MissingResultUrl)?;

        let output = observe("download", self.download(url)).await?;
        info!(
            "Conversion job {} finished: {} bytes of {}",
            job.id,
            output.len(),
            output_format
        );
        Ok(output)
    }
}

#[async_trait]
impl DocumentConverter for CloudConvertClient {
    fn name(&self) -> &str {
        "cloudconvert"
    }

    async fn convert_document(
        &self,
        bytes: &[u8],
        file_name: &str,
        output_format: TargetFormat,
    ) -> Result<Vec<u8>, JobServiceError> {
        let attempts = self.config.max_attempts.max(1);
        let mut backoff = Backoff::new(&self.config.poll);
        let mut attempt = 1;

        loop {
            match self.run_job(bytes, file_name, output_format).await {
                Ok(output) => return Ok(output),
                Err(e) if attempt < attempts && e.is_retryable() => {
                    let delay = backoff.next_delay();
                    warn!(
                        "Conversion of {} failed (attempt {}/{}), retrying in {:?}: {}",
                        file_name, attempt, attempts, delay, e
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

/// Record duration and outcome of one protocol stage.
async fn observe<T>(
    stage: &str,
    fut: impl std::future::Future<Output = Result<T, JobServiceError>>,
) -> Result<T, JobServiceError> {
    let start = Instant::now();
    let result = fut.await;
    JOB_SERVICE_DURATION
        .with_label_values(&[stage])
        .observe(start.elapsed().as_secs_f64());
    let outcome = match &result {
        Ok(_) => "success",
        Err(e) => e.kind(),
    };
    JOB_SERVICE_REQUESTS
        .with_label_values(&[stage, outcome])
        .inc();
    result
}

async fn check_status(response: Response) -> Result<Response, JobServiceError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let message = response.text().await.unwrap_or_default();
    Err(JobServiceError::ApiError {
        status: status.as_u16(),
        message,
    })
}

async fn parse_json<T: DeserializeOwned>(response: Response) -> Result<T, JobServiceError> {
    let body = response.bytes().await?;
    serde_json::from_slice(&body).map_err(|e| JobServiceError::ParseError(e.to_string()))
}
