//! Docker-backed judge
//!
//! Runs each submission in a throwaway container with no network, bounded
//! memory, and a pids limit. Exit status of the run maps to a verdict;
//! infrastructure failures surface as judge errors.

use std::collections::HashMap;

use async_trait::async_trait;
use base64::Engine;
use bollard::{
    Docker,
    container::LogOutput,
    exec::{CreateExecOptions, StartExecResults},
    models::ContainerCreateBody,
    query_parameters::{CreateContainerOptionsBuilder, RemoveContainerOptionsBuilder},
};
use futures::StreamExt;

use crate::{
    config::JudgeConfig,
    constants::verdicts,
    error::{AppError, AppResult},
    judge::{Judge, languages::LanguageHandler},
    models::{JudgeOutcome, Submission},
};

/// Exit code the `timeout` utility reports when the command was killed
const TIMEOUT_EXIT_CODE: i32 = 124;

/// Output of a single exec inside the container
struct ExecResult {
    stdout: String,
    stderr: String,
    exit_code: i32,
}

/// Judge that evaluates submissions in per-submission Docker containers
#[derive(Clone)]
pub struct DockerJudge {
    docker: Docker,
    config: JudgeConfig,
}

impl DockerJudge {
    pub fn new(docker: Docker, config: JudgeConfig) -> Self {
        Self { docker, config }
    }

    /// Create and start a container for a submission
    async fn create_container(&self, submission: &Submission) -> AppResult<String> {
        let handler = LanguageHandler::for_language(&submission.language)?;
        let container_name = format!("codeathon-{}", submission.id);

        let options = CreateContainerOptionsBuilder::default()
            .name(&container_name)
            .build();

        let memory_bytes = (self.config.memory_limit_mb * 1024 * 1024) as i64;
        let host_config = bollard::models::HostConfig {
            memory: Some(memory_bytes),
            memory_swap: Some(memory_bytes),
            cpu_period: Some(100000),
            cpu_quota: Some(100000), // 1 CPU
            network_mode: Some("none".to_string()),
            pids_limit: Some(64),
            ..Default::default()
        };

        let config = ContainerCreateBody {
            image: Some(handler.image().to_string()),
            tty: Some(true),
            open_stdin: Some(true),
            host_config: Some(host_config),
            working_dir: Some("/workspace".to_string()),
            env: Some(vec!["LANG=C.UTF-8".to_string()]),
            labels: Some({
                let mut labels = HashMap::new();
                labels.insert("codeathon.submission".to_string(), submission.id.to_string());
                labels
            }),
            ..Default::default()
        };

        let container = self.docker.create_container(Some(options), config).await?;

        self.docker
            .start_container(
                &container.id,
                None::<bollard::query_parameters::StartContainerOptions>,
            )
            .await?;

        Ok(container.id)
    }

    /// Remove a container, force-killing anything still running in it
    async fn remove_container(&self, container_id: &str) -> AppResult<()> {
        let options = RemoveContainerOptionsBuilder::default().force(true).build();
        self.docker
            .remove_container(container_id, Some(options))
            .await?;
        Ok(())
    }

    /// Write a file into the container workspace
    async fn write_file(&self, container_id: &str, path: &str, content: &str) -> AppResult<()> {
        // base64 round-trip avoids shell quoting issues in the source code
        let encoded = base64::engine::general_purpose::STANDARD.encode(content);
        let cmd = format!("echo '{encoded}' | base64 -d > {path}");
        self.exec_command(container_id, &cmd).await?;
        Ok(())
    }

    /// Execute a shell command in the container and collect its output
    async fn exec_command(&self, container_id: &str, cmd: &str) -> AppResult<ExecResult> {
        let exec = self
            .docker
            .create_exec(
                container_id,
                CreateExecOptions {
                    cmd: Some(vec!["/bin/sh", "-c", cmd]),
                    attach_stdout: Some(true),
                    attach_stderr: Some(true),
                    ..Default::default()
                },
            )
            .await?;

        let output = self.docker.start_exec(&exec.id, None).await?;

        let mut stdout = String::new();
        let mut stderr = String::new();

        if let StartExecResults::Attached { mut output, .. } = output {
            while let Some(msg) = output.next().await {
                match msg? {
                    LogOutput::StdOut { message } => {
                        stdout.push_str(&String::from_utf8_lossy(&message));
                    }
                    LogOutput::StdErr { message } => {
                        stderr.push_str(&String::from_utf8_lossy(&message));
                    }
                    _ => {}
                }
            }
        }

        let inspect = self.docker.inspect_exec(&exec.id).await?;
        let exit_code = inspect.exit_code.unwrap_or(-1) as i32;

        Ok(ExecResult {
            stdout,
            stderr,
            exit_code,
        })
    }

    /// Compile and run the submission inside the container
    async fn run_submission(
        &self,
        container_id: &str,
        submission: &Submission,
    ) -> AppResult<JudgeOutcome> {
        let handler = LanguageHandler::for_language(&submission.language)?;

        self.write_file(
            container_id,
            &format!("/workspace/{}", handler.source_file()),
            &submission.source_code,
        )
        .await?;

        if let Some(compile_cmd) = handler.compile_command() {
            let compile = self.exec_command(container_id, compile_cmd).await?;
            if compile.exit_code != 0 {
                tracing::debug!(
                    submission_id = %submission.id,
                    "Compilation failed: {}{}",
                    compile.stdout,
                    compile.stderr
                );
                return Ok(JudgeOutcome {
                    verdict: verdicts::COMPILATION_ERROR.to_string(),
                    score: 0.0,
                });
            }
        }

        let run_cmd = format!(
            "timeout {}s {}",
            self.config.time_limit_seconds,
            handler.run_command()
        );
        let run = self.exec_command(container_id, &run_cmd).await?;

        let outcome = match run.exit_code {
            0 => JudgeOutcome {
                verdict: verdicts::ACCEPTED.to_string(),
                score: 100.0,
            },
            TIMEOUT_EXIT_CODE => JudgeOutcome {
                verdict: verdicts::TIME_LIMIT_EXCEEDED.to_string(),
                score: 0.0,
            },
            _ => JudgeOutcome {
                verdict: verdicts::RUNTIME_ERROR.to_string(),
                score: 0.0,
            },
        };

        Ok(outcome)
    }

    /// Full container lifecycle for one submission. Runs on its own task so
    /// teardown is not skipped when the caller stops waiting (the dispatcher
    /// drops `evaluate` on timeout).
    async fn evaluate_in_container(self, submission: Submission) -> AppResult<JudgeOutcome> {
        let container_id = self.create_container(&submission).await?;

        let result = self.run_submission(&container_id, &submission).await;

        // Always tear the container down, even if the run failed
        if let Err(e) = self.remove_container(&container_id).await {
            tracing::warn!(
                submission_id = %submission.id,
                container_id = %container_id,
                "Failed to remove judge container: {}",
                e
            );
        }

        result
    }
}

#[async_trait]
impl Judge for DockerJudge {
    async fn evaluate(&self, submission: &Submission) -> AppResult<JudgeOutcome> {
        let task = tokio::spawn(
            self.clone()
                .evaluate_in_container(submission.clone()),
        );

        match task.await {
            Ok(result) => result.map_err(|e| AppError::Judge(e.to_string())),
            Err(e) => Err(AppError::Judge(format!("Judge task panicked: {e}"))),
        }
    }
}
