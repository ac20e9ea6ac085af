use super::session_response;
use crate::config::ServerConfig;
use crate::store::SessionStore;
use actix_multipart::{Field, Multipart};
use actix_web::{web, Responder};
use futures_util::StreamExt;
use log::debug;
use md5::Context;
use report_common::model::datasource::DataSource;
use report_common::model::table::Table;
use report_common::{ReportError, Result};

/// The uploaded `file` part: its name, the MD5 of its bytes and the bytes.
struct UploadedFile {
    file_name: String,
    md5: String,
    bytes: Vec<u8>,
}

/// `POST /api/publish/{session_id}/upload` with a multipart `file` field.
///
/// The whole file is read and parsed before the session is touched; a new
/// upload replaces the previous table and mapping.
pub(crate) async fn process(
    sessions: web::Data<SessionStore>,
    config: web::Data<ServerConfig>,
    session_id: web::Path<String>,
    payload: Multipart,
) -> impl Responder {
    let result = match ingest_upload(&config, payload).await {
        Ok((table, source)) => {
            sessions
                .update(&session_id, |s| s.ingest(table, source))
                .await
        }
        Err(e) => Err(e),
    };
    session_response(&sessions, &session_id, result).await
}

async fn ingest_upload(config: &ServerConfig, payload: Multipart) -> Result<(Table, DataSource)> {
    let file = read_csv_field(payload, config.upload_limit).await?;
    let text = String::from_utf8(file.bytes)
        .map_err(|_| ReportError::Parse("the file is not valid UTF-8".to_string()))?;
    let table = Table::parse(&text, config.table_dialect)?;
    let source = DataSource {
        file_name: file.file_name,
        md5: file.md5,
        dialect: config.table_dialect,
    };
    Ok((table, source))
}

fn multipart_error(e: impl std::fmt::Display) -> ReportError {
    ReportError::Parse(format!("multipart error: {}", e))
}

async fn drain(field: &mut Field) -> Result<()> {
    while let Some(chunk) = field.next().await {
        chunk.map_err(multipart_error)?;
    }
    Ok(())
}

async fn read_csv_field(mut payload: Multipart, limit: usize) -> Result<UploadedFile> {
    while let Some(item) = payload.next().await {
        let mut field = item.map_err(multipart_error)?;
        let field_name = field
            .content_disposition()
            .and_then(|cd| cd.get_name().map(|n| n.to_string()));
        if field_name.as_deref() != Some("file") {
            drain(&mut field).await?;
            continue;
        }

        let file_name = field
            .content_disposition()
            .and_then(|cd| cd.get_filename().map(|f| f.to_string()))
            .unwrap_or_default();
        if !file_name.to_lowercase().ends_with(".csv") {
            return Err(ReportError::Parse("The file must end with .csv".to_string()));
        }

        let mut hasher = Context::new();
        let mut bytes = Vec::new();
        while let Some(chunk) = field.next().await {
            let chunk = chunk.map_err(multipart_error)?;
            if bytes.len() + chunk.len() > limit {
                return Err(ReportError::Parse(format!(
                    "The file is larger than the {} byte upload limit",
                    limit
                )));
            }
            hasher.consume(&chunk);
            bytes.extend_from_slice(&chunk);
        }
        let md5 = format!("{:x}", hasher.finalize());
        debug!("received {} ({} bytes, md5 {})", file_name, bytes.len(), md5);
        return Ok(UploadedFile {
            file_name,
            md5,
            bytes,
        });
    }
    Err(ReportError::MissingField("file".to_string()))
}
