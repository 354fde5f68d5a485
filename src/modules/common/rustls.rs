use crate::{
    modules::{
        context::Initialize,
        error::{code::ErrorCode, TicketMailResult},
    },
    raise_error,
};

pub struct TicketMailTls;

impl Initialize for TicketMailTls {
    async fn initialize() -> TicketMailResult<()> {
        rustls::crypto::CryptoProvider::install_default(rustls::crypto::ring::default_provider())
            .map_err(|_| {
                raise_error!(
                    "failed to set crypto provider".into(),
                    ErrorCode::InternalError
                )
            })
    }
}
