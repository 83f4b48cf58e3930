use crate::{
    data::student::{Student, StudentPayload},
    error::{ApiError, ApiResult, CsvSnafu, CsvWriteSnafu, MultipartSnafu},
    routes::sse::StudentChange,
    state::AppState,
};
use axum::{
    Json,
    extract::{Multipart, State},
    http::header,
    response::IntoResponse,
};
use serde::Serialize;
use snafu::ResultExt;
use std::error::Error as _;

const CSV_COLUMNS: [&str; 4] = ["id", "first_name", "preferred_name", "last_name"];

#[derive(Serialize, Debug)]
pub struct ImportReport {
    pub imported: Vec<Student>,
    /// `false` if a store failure stopped the import before every row was tried.
    pub complete: bool,
    pub errors: Vec<String>,
}

pub async fn get_export_students(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let students = state.list_all().await?;

    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(vec![]);
    wtr.write_record(CSV_COLUMNS).context(CsvSnafu)?;
    for student in &students {
        wtr.serialize(student).context(CsvSnafu)?;
    }
    let bytes = wtr
        .into_inner()
        .map_err(|e| e.into_error())
        .context(CsvWriteSnafu)?;

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"students.csv\"",
            ),
        ],
        bytes,
    ))
}

pub async fn put_import_students(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> ApiResult<Json<ImportReport>> {
    let mut errors = vec![];
    let mut drafts = vec![];
    loop {
        let Some(field) = multipart.next_field().await.context(MultipartSnafu)? else {
            break;
        };

        let bytes = field.bytes().await.context(MultipartSnafu)?;
        let (mut good, mut bad) = read_students_csv(&bytes);
        drafts.append(&mut good);
        errors.append(&mut bad);
    }

    let mut imported = vec![];
    let mut complete = true;
    for draft in drafts {
        match state.insert(draft).await {
            Ok(student) => {
                state.announce(StudentChange::Created(student.clone()));
                imported.push(student);
            }
            Err(e @ ApiError::DuplicateStudent { .. }) => errors.push(e),
            Err(e) => {
                // earlier rows are already stored
                error!(?e, imported = imported.len(), "Stopping CSV import early");
                errors.push(e);
                complete = false;
                break;
            }
        }
    }

    info!(
        imported = imported.len(),
        rejected = errors.len(),
        complete,
        "Imported students from CSV"
    );

    Ok(Json(ImportReport {
        imported,
        complete,
        errors: errors.iter().map(describe).collect(),
    }))
}

/// Splits a CSV upload into the rows that parsed and the errors for those that didn't.
pub fn read_students_csv(bytes: &[u8]) -> (Vec<StudentPayload>, Vec<ApiError>) {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(bytes);

    let mut drafts = vec![];
    let mut syntax_errors = vec![];
    for record in rdr.deserialize::<StudentPayload>() {
        match record {
            Ok(draft) => drafts.push(draft),
            Err(source) => syntax_errors.push(ApiError::Csv { source }),
        }
    }

    (drafts, syntax_errors)
}

fn describe(error: &ApiError) -> String {
    match error.source() {
        Some(source) => format!("{error}: {source}"),
        None => error.to_string(),
    }
}
