/*!
 * Diffusion image generation backend.
 *
 * Sampling is delegated to an external stable-diffusion.cpp-style CLI; this
 * module invokes it with the request parameters and hands back the rendered
 * file. A mock model backs the test suite.
 */

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use log::{debug, error};
use tokio::process::Command;

use crate::app_config::ImageConfig;
use crate::errors::ServiceError;

/// One image rendering request, fully resolved (prompt already styled, seed
/// already chosen)
#[derive(Debug, Clone)]
pub struct ImageJob {
    pub prompt: String,
    pub negative_prompt: String,
    pub num_inference_steps: u32,
    pub width: u32,
    pub height: u32,
    pub seed: u64,
    pub output_path: PathBuf,
}

/// Common trait for image generation backends
#[async_trait]
pub trait ImageModel: Send + Sync {
    /// Render the job to `job.output_path`
    async fn generate(&self, job: &ImageJob) -> Result<(), ServiceError>;
}

/// stable-diffusion.cpp CLI wrapper
pub struct SdCli {
    command: String,
    model: String,
    timeout: Duration,
}

impl SdCli {
    /// Construct the backend, verifying the model file up front so a broken
    /// deployment fails at initialization rather than mid-request
    pub fn load(config: &ImageConfig) -> Result<Self, ServiceError> {
        if !Path::new(&config.model).exists() {
            return Err(ServiceError::ModelLoadFailed(format!(
                "model file not found: {}",
                config.model
            )));
        }
        Ok(SdCli {
            command: config.command.clone(),
            model: config.model.clone(),
            timeout: Duration::from_secs(config.timeout_secs),
        })
    }
}

#[async_trait]
impl ImageModel for SdCli {
    async fn generate(&self, job: &ImageJob) -> Result<(), ServiceError> {
        debug!(
            "Rendering {}x{} image, {} steps, seed {}",
            job.width, job.height, job.num_inference_steps, job.seed
        );

        let sd_future = Command::new(&self.command)
            .args([
                "-m",
                &self.model,
                "-p",
                &job.prompt,
                "-n",
                &job.negative_prompt,
                "--steps",
                &job.num_inference_steps.to_string(),
                "-W",
                &job.width.to_string(),
                "-H",
                &job.height.to_string(),
                "-s",
                &job.seed.to_string(),
                "-o",
                job.output_path.to_str().unwrap_or_default(),
            ])
            .output();

        let output = tokio::select! {
            result = sd_future => {
                result.map_err(|e| {
                    if e.kind() == std::io::ErrorKind::NotFound {
                        ServiceError::ModelLoadFailed(format!(
                            "image binary not found: {}", self.command
                        ))
                    } else {
                        ServiceError::InferenceFailed(format!(
                            "failed to execute {}: {}", self.command, e
                        ))
                    }
                })?
            },
            _ = tokio::time::sleep(self.timeout) => {
                return Err(ServiceError::InferenceFailed(format!(
                    "image generation timed out after {} seconds", self.timeout.as_secs()
                )));
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            error!("Image generation failed: {}", stderr.trim());
            return Err(ServiceError::InferenceFailed(stderr.trim().to_string()));
        }

        if !job.output_path.exists() {
            return Err(ServiceError::InferenceFailed(format!(
                "image command produced no output file: {}",
                job.output_path.display()
            )));
        }

        Ok(())
    }
}

/// Preset image model for tests: writes a one-pixel PNG
pub struct MockImageModel;

/// Smallest valid PNG (1x1, opaque) for mock output
const PLACEHOLDER_PNG: &[u8] = &[
    0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44,
    0x52, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x02, 0x00, 0x00, 0x00, 0x90,
    0x77, 0x53, 0xDE, 0x00, 0x00, 0x00, 0x0C, 0x49, 0x44, 0x41, 0x54, 0x08, 0xD7, 0x63, 0xF8,
    0xCF, 0xC0, 0x00, 0x00, 0x00, 0x03, 0x00, 0x01, 0x87, 0xA1, 0x4E, 0xC8, 0x00, 0x00, 0x00,
    0x00, 0x49, 0x45, 0x4E, 0x44, 0xAE, 0x42, 0x60, 0x82,
];

#[async_trait]
impl ImageModel for MockImageModel {
    async fn generate(&self, job: &ImageJob) -> Result<(), ServiceError> {
        std::fs::write(&job.output_path, PLACEHOLDER_PNG)?;
        Ok(())
    }
}
