//! The `email` coarse type: parse a `.eml` in process via `mail-parser`
//! (the structural analogue of the original's in-process stdlib `email`
//! module -- no CLI tool does this job), extract `text/plain` parts and
//! attachments, then recurse P0 over the attachments.

use crate::errors::app_err;
use crate::temp_dir::{cleanup_temp_dir, make_temp_dir};
use crate::ParseContext;
use hoover_engine::{
    child_workflow_id, execute_activity, execute_child_workflow, ActivityOptions, ChildWorkflowOptions, TaskQueue,
    WorkflowError,
};
use hoover_scan::ScanInput;
use hoover_store::container::{insert_container_marker, ContainerKind};
use hoover_types::{chunk_utf8, ExtractedBy, TextContentRow, MAX_TEXT_PAGE_BYTES};
use mail_parser::{Address, MessageParser};
use serde::Serialize;
use std::path::Path;
use std::time::Duration;

fn addresses_to_string(value: &Address) -> String {
    let mut out = Vec::new();
    match value {
        Address::List(addrs) => {
            for addr in addrs {
                if let Some(email) = &addr.address {
                    out.push(email.to_string());
                }
            }
        }
        Address::Group(groups) => {
            for group in groups {
                for addr in &group.addresses {
                    if let Some(email) = &addr.address {
                        out.push(email.to_string());
                    }
                }
            }
        }
    }
    out.join(", ")
}

fn normalize_date(message: &mail_parser::Message) -> chrono::NaiveDateTime {
    message
        .date()
        .and_then(|d| chrono::DateTime::from_timestamp(d.to_timestamp(), 0))
        .map(|dt| dt.naive_utc())
        .unwrap_or_else(|| chrono::DateTime::from_timestamp(0, 0).unwrap().naive_utc())
}

fn sanitize_filename(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);
    let cleaned: String = base
        .chars()
        .map(|c| if c.is_control() { '_' } else { c })
        .collect();
    if cleaned.is_empty() {
        "attachment".to_string()
    } else {
        cleaned
    }
}

/// Parses headers/subject/addresses/`text/plain` bodies and persists them:
/// a container marker (the light attribute set) plus text-content pages
/// tagged `email_parser`.
pub async fn parse_email_headers_and_text(
    store: &hoover_store::StoreClient,
    dataset: &str,
    hash: &str,
    file_path: &Path,
) -> Result<(), std::io::Error> {
    let bytes = tokio::fs::read(file_path).await?;
    let message = MessageParser::default()
        .parse(&bytes)
        .ok_or_else(|| std::io::Error::other("failed to parse email message"))?;

    let subject = message.subject().unwrap_or_default();
    let from = message.from().map(addresses_to_string).unwrap_or_default();
    let to = message.to().map(addresses_to_string).unwrap_or_default();
    let cc = message.cc().map(addresses_to_string).unwrap_or_default();
    let bcc = message.bcc().map(addresses_to_string).unwrap_or_default();
    let date = normalize_date(&message);

    let attributes = serde_json::json!({
        "subject": subject,
        "from": from,
        "to": to,
        "cc": cc,
        "bcc": bcc,
        "date": date.format("%Y-%m-%dT%H:%M:%S").to_string(),
    });
    insert_container_marker(store, dataset, hash, ContainerKind::Email, &attributes)
        .await
        .map_err(std::io::Error::other)?;

    let mut rows = Vec::new();
    let mut page_id: u32 = 0;
    for part in message.text_bodies() {
        if let Some(text) = part.text_contents() {
            for page in chunk_utf8(text.as_bytes(), MAX_TEXT_PAGE_BYTES) {
                rows.push(TextContentRow {
                    collection_dataset: dataset.to_string(),
                    file_hash: hash.to_string(),
                    extracted_by: ExtractedBy::EmailParser,
                    page_id,
                    text: page,
                });
                page_id += 1;
            }
        }
    }
    if !rows.is_empty() {
        hoover_store::text::insert_text_content(store, &rows).await.map_err(std::io::Error::other)?;
    }
    Ok(())
}

/// Writes every attachment part to `out_dir` with a sanitized filename,
/// matching attachments by `Content-Disposition: attachment` or the
/// presence of a filename, as the original does.
async fn extract_attachments(file_path: &Path, out_dir: &Path) -> Result<usize, std::io::Error> {
    let bytes = tokio::fs::read(file_path).await?;
    let message = MessageParser::default()
        .parse(&bytes)
        .ok_or_else(|| std::io::Error::other("failed to parse email message"))?;

    let mut count = 0usize;
    for (i, attachment) in message.attachments().enumerate() {
        let name = attachment
            .attachment_name()
            .map(sanitize_filename)
            .unwrap_or_else(|| format!("attachment_{i}"));
        let dest = out_dir.join(format!("{i:04}_{name}"));
        tokio::fs::write(&dest, attachment.contents()).await?;
        count += 1;
    }
    Ok(count)
}

#[derive(Serialize)]
struct EmailScanParams {
    dataset: String,
    email_hash: String,
}

pub async fn email_extract_and_scan(
    ctx: &ParseContext,
    dataset: &str,
    email_hash: &str,
    email_path: &Path,
    timeout: Duration,
) -> Result<(), WorkflowError> {
    let options = ActivityOptions::new(timeout, TaskQueue::Common);

    execute_activity("parse_email_headers_and_text", &options, || async {
        parse_email_headers_and_text(&ctx.store, dataset, email_hash, email_path)
            .await
            .map_err(app_err)
    })
    .await?;

    let out_dir = execute_activity("extract_email_attachments", &options, || async {
        let out_dir = make_temp_dir(dataset, "email", email_hash).await.map_err(app_err)?;
        extract_attachments(email_path, &out_dir).await.map_err(app_err)?;
        Ok(out_dir)
    })
    .await?;

    let params = EmailScanParams {
        dataset: dataset.to_string(),
        email_hash: email_hash.to_string(),
    };
    let child_id = child_workflow_id("email_extract_and_scan", &params).unwrap_or_else(|_| "scan-email".to_string());
    let child_options = ChildWorkflowOptions { id: child_id, task_queue: TaskQueue::Common };
    let scan_input = ScanInput::for_container(dataset.to_string(), out_dir.clone(), email_hash.to_string());
    execute_child_workflow("scan", &child_options, || hoover_scan::scan(&ctx.scan, scan_input)).await?;

    execute_activity("cleanup_temp_dir", &options, || {
        let out_dir = out_dir.clone();
        async move {
            cleanup_temp_dir(&out_dir).await;
            Ok::<(), WorkflowError>(())
        }
    })
    .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_filename_strips_path_and_control_chars() {
        assert_eq!(sanitize_filename("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_filename(""), "attachment");
    }
}
