// Copyright © 2025 rustmailer.com
// Licensed under RustMailer License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use poem_openapi::types::{ParseFromJSON, ToJSON, Type};
use poem_openapi::Object;
use serde::{Deserialize, Serialize};

use crate::modules::database::Paginated;

/// One page of a listing endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Object)]
pub struct DataPage<S>
where
    S: Serialize + std::fmt::Debug + Unpin + Send + Sync + Type + ParseFromJSON + ToJSON,
{
    /// The current page number (starting from 1).
    pub current_page: Option<u64>,
    pub page_size: Option<u64>,
    /// Number of items across all pages.
    pub total_items: u64,
    pub items: Vec<S>,
    /// Only set when the request asked for a page.
    pub total_pages: Option<u64>,
}

impl<S> From<Paginated<S>> for DataPage<S>
where
    S: Serialize + std::fmt::Debug + Unpin + Send + Sync + Type + ParseFromJSON + ToJSON,
{
    fn from(paginated: Paginated<S>) -> Self {
        DataPage {
            current_page: paginated.page,
            page_size: paginated.page_size,
            total_items: paginated.total_items,
            total_pages: paginated.total_pages,
            items: paginated.items,
        }
    }
}
