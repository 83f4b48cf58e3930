use crate::{
    data::student::{Student, StudentPayload},
    error::ApiResult,
};
use async_trait::async_trait;
use std::fmt::Debug;

pub mod memory;
pub mod postgres;

/// Data access for students. Absence is `Ok(None)`, never an error.
#[async_trait]
pub trait StudentStore: Debug + Send + Sync {
    /// Every student, in insertion order.
    async fn list_all(&self) -> ApiResult<Vec<Student>>;
    async fn find_by_id(&self, id: &str) -> ApiResult<Option<Student>>;
    /// Stores a new student, generating an id if the payload doesn't carry one.
    async fn insert(&self, to_be_added: StudentPayload) -> ApiResult<Student>;
    /// Replaces every field but the id. `None` if no student has that id.
    async fn replace(&self, id: &str, replacement: StudentPayload) -> ApiResult<Option<Student>>;
    async fn remove_by_id(&self, id: &str) -> ApiResult<Option<Student>>;

    async fn close(&self) {}
}
