use crate::{
    data::student::{Student, StudentPayload},
    error::{ApiResult, DuplicateStudentSnafu},
    store::StudentStore,
};
use async_trait::async_trait;
use tokio::sync::RwLock;

#[derive(Debug, Default)]
pub struct InMemoryStudentStore {
    students: RwLock<Vec<Student>>,
}

impl InMemoryStudentStore {
    #[cfg(test)]
    pub fn with_students(students: impl IntoIterator<Item = Student>) -> Self {
        Self {
            students: RwLock::new(students.into_iter().collect()),
        }
    }
}

#[async_trait]
impl StudentStore for InMemoryStudentStore {
    async fn list_all(&self) -> ApiResult<Vec<Student>> {
        Ok(self.students.read().await.clone())
    }

    async fn find_by_id(&self, id: &str) -> ApiResult<Option<Student>> {
        Ok(self
            .students
            .read()
            .await
            .iter()
            .find(|student| student.id == id)
            .cloned())
    }

    async fn insert(&self, to_be_added: StudentPayload) -> ApiResult<Student> {
        let id = to_be_added.id_or_generate();

        let mut students = self.students.write().await;
        if students.iter().any(|student| student.id == id) {
            return DuplicateStudentSnafu { id }.fail();
        }

        let student = to_be_added.into_student(id);
        students.push(student.clone());
        Ok(student)
    }

    async fn replace(&self, id: &str, replacement: StudentPayload) -> ApiResult<Option<Student>> {
        let mut students = self.students.write().await;
        let Some(existing) = students.iter_mut().find(|student| student.id == id) else {
            return Ok(None);
        };

        *existing = replacement.into_student(id.to_string());
        Ok(Some(existing.clone()))
    }

    async fn remove_by_id(&self, id: &str) -> ApiResult<Option<Student>> {
        let mut students = self.students.write().await;
        let Some(index) = students.iter().position(|student| student.id == id) else {
            return Ok(None);
        };

        Ok(Some(students.remove(index)))
    }
}
