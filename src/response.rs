//! Response shaping helpers. Rows are returned as raw JSON bodies; the one
//! enveloped endpoint (tag search) uses the pagination wrapper below.

use serde::Serialize;

#[derive(Serialize)]
pub struct Paginated<T> {
    pub data: Vec<T>,
    pub pagination: Pagination,
}

#[derive(Serialize)]
pub struct Pagination {
    pub offset: u32,
    pub limit: u32,
    pub total: u64,
}

pub fn paginated<T: Serialize>(data: Vec<T>, offset: u32, limit: u32, total: u64) -> Paginated<T> {
    Paginated {
        data,
        pagination: Pagination {
            offset,
            limit,
            total,
        },
    }
}
