//! HTTP mask applier for Dahua-style cameras.
//!
//! Each camera exposes four fixed overlay regions; masking toggles the
//! `EncodeBlend` flag of every region through the camera's CGI
//! configuration endpoint, authenticated with HTTP digest.

use super::{CameraResult, MaskApplier};
use crate::config::CameraAccount;
use crate::error::{Result, SentinelError};
use crate::inventory::Camera;
use async_trait::async_trait;
use digest_auth::AuthContext;
use futures_util::future::join_all;
use log::error;
use reqwest::{Client, StatusCode, header};
use std::time::Duration;

/// Number of overlay regions configured per camera.
pub const COVER_REGIONS: usize = 4;

/// Upper bound for one configuration call; a hung camera must not
/// stall the rest of the fleet beyond this.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

fn cover_path(region: usize, masked: bool) -> String {
    format!(
        "/cgi-bin/configManager.cgi?action=setConfig&VideoWidget[0].Covers[{region}].EncodeBlend={masked}"
    )
}

fn cover_url(ip: &str, region: usize, masked: bool) -> String {
    format!("http://{ip}{}", cover_path(region, masked))
}

pub struct HttpMaskApplier {
    client: Client,
    account: CameraAccount,
}

impl HttpMaskApplier {
    pub fn new(account: CameraAccount) -> Result<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| SentinelError::Http(e.to_string()))?;

        Ok(Self { client, account })
    }

    /// Set one overlay region, answering a digest challenge if the
    /// camera issues one.
    async fn set_region(&self, ip: &str, region: usize, masked: bool) -> std::result::Result<(), String> {
        let url = cover_url(ip, region, masked);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| e.to_string())?;

        let response = if response.status() == StatusCode::UNAUTHORIZED {
            let challenge = response
                .headers()
                .get(header::WWW_AUTHENTICATE)
                .ok_or_else(|| "401 without WWW-Authenticate challenge".to_string())?
                .to_str()
                .map_err(|e| e.to_string())?;

            let mut prompt = digest_auth::parse(challenge).map_err(|e| e.to_string())?;
            let context = AuthContext::new(
                self.account.username.as_str(),
                self.account.password.as_str(),
                cover_path(region, masked),
            );
            let answer = prompt.respond(&context).map_err(|e| e.to_string())?;

            self.client
                .get(&url)
                .header(header::AUTHORIZATION, answer.to_string())
                .send()
                .await
                .map_err(|e| e.to_string())?
        } else {
            response
        };

        if response.status() == StatusCode::OK {
            Ok(())
        } else {
            Err(format!("HTTP {}", response.status()))
        }
    }

    /// Walk all overlay regions of one camera in order. Regions fail
    /// independently; the aggregate lists every failed region.
    async fn apply_camera(&self, camera: &Camera, masked: bool) -> CameraResult {
        let mut failures = Vec::new();

        for region in 0..COVER_REGIONS {
            if let Err(detail) = self.set_region(&camera.ip, region, masked).await {
                error!(
                    "Request to {} failed for cover region {region}: {detail}",
                    camera.ip
                );
                failures.push(format!("region {region}: {detail}"));
            }
        }

        CameraResult {
            camera: camera.clone(),
            ok: failures.is_empty(),
            detail: if failures.is_empty() {
                None
            } else {
                Some(failures.join("; "))
            },
        }
    }
}

#[async_trait]
impl MaskApplier for HttpMaskApplier {
    async fn apply(&self, cameras: &[Camera], masked: bool) -> Vec<CameraResult> {
        join_all(
            cameras
                .iter()
                .map(|camera| self.apply_camera(camera, masked)),
        )
        .await
    }
}
