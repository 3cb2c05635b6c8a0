use crate::{
    error::ApiError,
    samples::{CatalogItem, RESULT_OUTPUTS, SampleEntry},
    session::{SESSION_COOKIE, SessionRecord},
    state::AppState,
    storage::{remove_best_effort, sanitize_filename},
};
use artifacts::{PlotOptions, encode_labels_png, render_plot};
use axum::{
    Form, Json, Router,
    extract::{DefaultBodyLimit, Multipart, Path, State},
    http::header,
    response::IntoResponse,
    routing::{get, post},
};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use common::span;
use inference::{SegmentError, SegmentOutcome, SegmentationModel};
use preprocess::decode_image;
use schema::{OutputKind, SegmentForm, SegmentResponse};
use serde::Serialize;
use std::path::PathBuf;
use tower_http::cors::CorsLayer;

/// Path segment of `/results/{filename}` that selects the session upload.
pub const USER_UPLOAD: &str = "user";

/// Bound shared by every handler: the model must move into blocking tasks.
pub trait ServedModel: SegmentationModel + Send + 'static {}
impl<B: SegmentationModel + Send + 'static> ServedModel for B {}

pub fn router<B: ServedModel>(state: AppState<B>, max_body_bytes: usize) -> Router {
    Router::new()
        .route("/", get(index::<B>).post(upload::<B>))
        .route("/segment", post(segment::<B>))
        .route("/image", get(user_image::<B>))
        .route("/image/:filename", get(sample_image::<B>))
        .route("/results/:filename", post(results::<B>))
        .route("/download_masks", get(download_masks::<B>))
        .route("/tmp/:filename", get(stored_file::<B>))
        .route("/models/:filename", get(model_file::<B>))
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Plots and mask link returned by `/results`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResultsReply {
    pub outlines: String,
    pub overlay: String,
    pub flow: String,
    pub image: String,
    pub download: String,
}

impl ResultsReply {
    fn from_outcome(outcome: &SegmentOutcome, download: String) -> Result<Self, ApiError> {
        let plot = |kind: OutputKind| {
            outcome
                .artifacts
                .get(&kind)
                .and_then(|artifact| artifact.as_encoded())
                .map(str::to_string)
                .ok_or_else(|| ApiError::Internal(format!("{kind} missing from results")))
        };
        Ok(Self {
            outlines: plot(OutputKind::OutlinePlot)?,
            overlay: plot(OutputKind::OverlayPlot)?,
            flow: plot(OutputKind::FlowPlot)?,
            image: plot(OutputKind::ImgPlot)?,
            download,
        })
    }
}

fn session_id(jar: &CookieJar) -> Option<String> {
    jar.get(SESSION_COOKIE).map(|cookie| cookie.value().to_string())
}

fn session_record<B>(state: &AppState<B>, jar: &CookieJar) -> Result<SessionRecord, ApiError> {
    session_id(jar)
        .and_then(|id| state.sessions.get(&id))
        .ok_or(ApiError::NoSession)
}

/// Run the pipeline on raw image bytes off the async runtime.
async fn run_segmentation<B: ServedModel>(
    state: &AppState<B>,
    bytes: Vec<u8>,
    form: SegmentForm,
) -> Result<SegmentOutcome, ApiError> {
    let service = state.service.clone();
    let outcome =
        tokio::task::spawn_blocking(move || service.segment_bytes(&bytes, &form)).await??;
    Ok(outcome)
}

async fn index<B: ServedModel>(State(state): State<AppState<B>>) -> Json<Vec<CatalogItem>> {
    Json(state.samples.entries())
}

async fn segment<B: ServedModel>(
    State(state): State<AppState<B>>,
    Form(form): Form<SegmentForm>,
) -> Result<Json<SegmentResponse>, ApiError> {
    let service = state.service.clone();
    let response = tokio::task::spawn_blocking(move || service.handle(&form)).await?;
    Ok(Json(response))
}

async fn upload<B: ServedModel>(
    State(state): State<AppState<B>>,
    jar: CookieJar,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let mut file = None;
    while let Some(field) = multipart.next_field().await? {
        if let Some(name) = field.file_name().map(str::to_string) {
            file = Some((name, field.bytes().await?));
            break;
        }
    }
    let (name, bytes) = file.ok_or_else(|| ApiError::BadRequest("no file field".to_string()))?;

    let id = session_id(&jar).unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
    if let Some(previous) = state.sessions.take(&id) {
        remove_best_effort(&previous.upload_path).await;
        if let Some(masks_path) = &previous.masks_path {
            remove_best_effort(masks_path).await;
        }
    }

    let stored = state.uploads.store(&name, &bytes).await?;
    tracing::info!(session = %id, path = %stored.path.display(), "Upload recorded");
    state.sessions.insert(
        &id,
        SessionRecord {
            upload_path: stored.path,
            filestring: stored.filestring,
            masks_path: None,
        },
    );

    let cookie = Cookie::build((SESSION_COOKIE, id)).path("/").http_only(true);
    Ok((jar.add(cookie), "uploading..."))
}

async fn render_image_plot(bytes: Vec<u8>) -> Result<impl IntoResponse, ApiError> {
    let png = tokio::task::spawn_blocking(move || -> Result<Vec<u8>, SegmentError> {
        let _s = span!("render_image_plot");
        let image = decode_image(&bytes, None).map_err(SegmentError::Decode)?;
        render_plot(&image.view(), &[], PlotOptions { axis_on: true })
            .map_err(SegmentError::Encoding)
    })
    .await??;
    Ok(([(header::CONTENT_TYPE, "image/png")], png))
}

async fn user_image<B: ServedModel>(
    State(state): State<AppState<B>>,
    jar: CookieJar,
) -> Result<impl IntoResponse, ApiError> {
    let record = session_record(&state, &jar)?;
    let bytes = tokio::fs::read(&record.upload_path).await?;
    render_image_plot(bytes).await
}

async fn sample_image<B: ServedModel>(
    State(state): State<AppState<B>>,
    Path(filename): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let entry = sample_entry(&state, &filename)?;
    let bytes = tokio::fs::read(state.samples.path(&entry)).await?;
    render_image_plot(bytes).await
}

fn sample_entry<B>(state: &AppState<B>, filename: &str) -> Result<SampleEntry, ApiError> {
    state
        .samples
        .get(filename)
        .ok_or_else(|| ApiError::NotFound(format!("sample {filename}")))
}

async fn results<B: ServedModel>(
    State(state): State<AppState<B>>,
    jar: CookieJar,
    Path(filename): Path<String>,
    form: Option<Form<SegmentForm>>,
) -> Result<Json<ResultsReply>, ApiError> {
    if filename == USER_UPLOAD {
        let id = session_id(&jar).ok_or(ApiError::NoSession)?;
        let record = state.sessions.get(&id).ok_or(ApiError::NoSession)?;
        let bytes = tokio::fs::read(&record.upload_path).await?;

        let mut form = form.map(|Form(form)| form).unwrap_or_default();
        form.input = None;
        form.format = None;
        form.outputs = Some(RESULT_OUTPUTS.to_string());

        let outcome = run_segmentation(&state, bytes, form).await?;
        let masks_path = state.uploads.masks_path(&record.filestring);
        write_masks(&outcome, &masks_path).await?;
        if !state
            .sessions
            .set_masks_path(&id, &record.filestring, masks_path.clone())
        {
            // The session uploaded again while this one was segmenting.
            remove_best_effort(&masks_path).await;
            return Err(ApiError::Superseded(record.filestring));
        }

        Ok(Json(ResultsReply::from_outcome(
            &outcome,
            "/download_masks".to_string(),
        )?))
    } else {
        let entry = sample_entry(&state, &filename)?;
        let bytes = tokio::fs::read(state.samples.path(&entry)).await?;
        let outcome = run_segmentation(&state, bytes, entry.form()).await?;

        let stem = filename.trim_end_matches(".png");
        let masks_name = format!("{stem}_masks.png");
        write_masks(&outcome, &state.uploads.dir().join(&masks_name)).await?;

        Ok(Json(ResultsReply::from_outcome(
            &outcome,
            format!("/tmp/{masks_name}"),
        )?))
    }
}

async fn write_masks(outcome: &SegmentOutcome, path: &std::path::Path) -> Result<(), ApiError> {
    let png = encode_labels_png(&outcome.labels.view()).map_err(SegmentError::Encoding)?;
    let saved: std::io::Result<()> = async {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(path, png).await
    }
    .await;
    saved.map_err(|e| {
        SegmentError::Resource(format!("cannot save masks to {}: {e}", path.display()))
    })?;
    tracing::debug!(path = %path.display(), "Saved mask PNG");
    Ok(())
}

async fn download_masks<B: ServedModel>(
    State(state): State<AppState<B>>,
    jar: CookieJar,
) -> Result<impl IntoResponse, ApiError> {
    let record = session_record(&state, &jar)?;
    let path = record
        .masks_path
        .ok_or_else(|| ApiError::NotFound("no masks computed for this session".to_string()))?;
    let bytes = tokio::fs::read(&path).await?;
    let disposition = format!("attachment; filename=\"{}_masks.png\"", record.filestring);
    Ok((
        [
            (header::CONTENT_TYPE, "image/png".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    ))
}

async fn stored_file<B: ServedModel>(
    State(state): State<AppState<B>>,
    Path(filename): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let path = state
        .uploads
        .resolve(&filename)
        .ok_or_else(|| ApiError::NotFound(filename.clone()))?;
    let bytes = tokio::fs::read(&path).await?;
    Ok(([(header::CONTENT_TYPE, content_type(&filename))], bytes))
}

async fn model_file<B: ServedModel>(
    State(state): State<AppState<B>>,
    Path(filename): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let path: PathBuf = sanitize_filename(&filename)
        .filter(|clean| *clean == filename)
        .map(|clean| state.service.registry().models_dir().join(clean))
        .ok_or_else(|| ApiError::NotFound(filename.clone()))?;
    let bytes = tokio::fs::read(&path).await?;
    let disposition = format!("attachment; filename=\"{filename}\"");
    Ok((
        [
            (header::CONTENT_TYPE, "application/octet-stream".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    ))
}

fn content_type(filename: &str) -> &'static str {
    let extension = filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match extension.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "tif" | "tiff" => "image/tiff",
        "bmp" => "image/bmp",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_type() {
        assert_eq!(content_type("a.PNG"), "image/png");
        assert_eq!(content_type("a.tif"), "image/tiff");
        assert_eq!(content_type("a.jpeg"), "image/jpeg");
        assert_eq!(content_type("noext"), "application/octet-stream");
    }
}
