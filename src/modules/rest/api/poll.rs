// Copyright © 2025 rustmailer.com
// Licensed under RustMailer License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use poem_openapi::payload::Json;
use poem_openapi::OpenApi;

use crate::modules::poller::runner::PollRunner;
use crate::modules::poller::summary::PollSummary;
use crate::modules::rest::api::ApiTags;
use crate::modules::rest::ApiResult;

pub struct PollApi;

#[OpenApi(prefix_path = "/api/v1", tag = "ApiTags::Poll")]
impl PollApi {
    /// Polls the support mailbox once.
    ///
    /// Unseen mail is turned into ticket messages and marked seen. Per-message
    /// failures only show up in `errors`; connection and login failures fail the
    /// request. Returns 409 while another poll is running.
    #[oai(method = "post", path = "/poll", operation_id = "run_poll")]
    async fn run_poll(&self) -> ApiResult<Json<PollSummary>> {
        let summary = PollRunner::get()?.run_once().await?;
        Ok(Json(summary))
    }
}
