use crate::{
    config::DbConfig,
    data::student::{Student, StudentPayload},
    error::{
        ApiError, ApiResult, DuplicateStudentSnafu, MakeQuerySnafu, MigrateSnafu,
        OpenDatabaseSnafu,
    },
    store::StudentStore,
};
use async_trait::async_trait;
use snafu::ResultExt;
use sqlx::{Pool, Postgres, postgres::PgPoolOptions};

#[derive(Debug, Clone)]
pub struct PostgresStudentStore {
    pool: Pool<Postgres>,
}

impl PostgresStudentStore {
    pub async fn connect(options: PgPoolOptions, config: &DbConfig) -> ApiResult<Self> {
        let pool = options
            .connect(&config.get_db_path())
            .await
            .context(OpenDatabaseSnafu)?;

        sqlx::migrate!().run(&pool).await.context(MigrateSnafu)?;

        Ok(Self { pool })
    }
}

#[async_trait]
impl StudentStore for PostgresStudentStore {
    async fn list_all(&self) -> ApiResult<Vec<Student>> {
        sqlx::query_as::<_, Student>(
            "SELECT id, first_name, preferred_name, last_name FROM public.students ORDER BY seq",
        )
        .fetch_all(&self.pool)
        .await
        .context(MakeQuerySnafu)
    }

    async fn find_by_id(&self, id: &str) -> ApiResult<Option<Student>> {
        sqlx::query_as::<_, Student>(
            "SELECT id, first_name, preferred_name, last_name FROM public.students WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context(MakeQuerySnafu)
    }

    async fn insert(&self, to_be_added: StudentPayload) -> ApiResult<Student> {
        let id = to_be_added.id_or_generate();
        let Student {
            id,
            first_name,
            preferred_name,
            last_name,
        } = to_be_added.into_student(id);

        let result = sqlx::query_as::<_, Student>("INSERT INTO public.students (id, first_name, preferred_name, last_name) VALUES ($1, $2, $3, $4) RETURNING id, first_name, preferred_name, last_name")
            .bind(&id)
            .bind(first_name)
            .bind(preferred_name)
            .bind(last_name)
            .fetch_one(&self.pool)
            .await;

        match result {
            Ok(student) => Ok(student),
            Err(sqlx::Error::Database(db_error)) if db_error.is_unique_violation() => {
                DuplicateStudentSnafu { id }.fail()
            }
            Err(source) => Err(ApiError::MakeQuery { source }),
        }
    }

    async fn replace(&self, id: &str, replacement: StudentPayload) -> ApiResult<Option<Student>> {
        let Student {
            first_name,
            preferred_name,
            last_name,
            ..
        } = replacement.into_student(id.to_string());

        sqlx::query_as::<_, Student>("UPDATE public.students SET first_name = $2, preferred_name = $3, last_name = $4 WHERE id = $1 RETURNING id, first_name, preferred_name, last_name")
            .bind(id)
            .bind(first_name)
            .bind(preferred_name)
            .bind(last_name)
            .fetch_optional(&self.pool)
            .await
            .context(MakeQuerySnafu)
    }

    async fn remove_by_id(&self, id: &str) -> ApiResult<Option<Student>> {
        sqlx::query_as::<_, Student>("DELETE FROM public.students WHERE id = $1 RETURNING id, first_name, preferred_name, last_name")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .context(MakeQuerySnafu)
    }

    async fn close(&self) {
        self.pool.close().await;
    }
}

// These need a live database: `DATABASE_URL=postgres://… cargo test -- --ignored`.
#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ApiError;
    use sqlx::PgPool;

    fn payload(id: Option<&str>, first_name: &str) -> StudentPayload {
        StudentPayload {
            id: id.map(ToString::to_string),
            first_name: first_name.into(),
            preferred_name: Some(String::new()),
            last_name: "Smith".into(),
        }
    }

    #[sqlx::test]
    #[ignore = "needs DATABASE_URL"]
    async fn crud_round_trip(pool: PgPool) {
        let store = PostgresStudentStore { pool };

        let ada = store.insert(payload(Some("1"), "Ada")).await.unwrap();
        assert_eq!(ada.preferred_name, None);
        let generated = store.insert(payload(None, "Brian")).await.unwrap();
        assert!(!generated.id.is_empty());
        assert_eq!(store.list_all().await.unwrap(), vec![ada.clone(), generated.clone()]);

        let updated = store
            .replace("1", payload(Some("ignored"), "Adaline"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.id, "1");
        assert_eq!(store.find_by_id("1").await.unwrap(), Some(updated.clone()));

        assert_eq!(store.remove_by_id("1").await.unwrap(), Some(updated));
        assert_eq!(store.find_by_id("1").await.unwrap(), None);
        assert_eq!(store.list_all().await.unwrap(), vec![generated]);
    }

    #[sqlx::test]
    #[ignore = "needs DATABASE_URL"]
    async fn missing_ids_are_none(pool: PgPool) {
        let store = PostgresStudentStore { pool };

        assert_eq!(store.find_by_id("100").await.unwrap(), None);
        assert_eq!(store.replace("100", payload(None, "Nobody")).await.unwrap(), None);
        assert_eq!(store.remove_by_id("100").await.unwrap(), None);
        assert!(store.list_all().await.unwrap().is_empty());
    }

    #[sqlx::test]
    #[ignore = "needs DATABASE_URL"]
    async fn duplicate_ids_are_rejected(pool: PgPool) {
        let store = PostgresStudentStore { pool };

        store.insert(payload(Some("1"), "Ada")).await.unwrap();
        let err = store.insert(payload(Some("1"), "Brian")).await.unwrap_err();
        assert!(matches!(err, ApiError::DuplicateStudent { id } if id == "1"));
    }
}
