use crate::AppContext;
use crate::cli::commands::user::login;
use crate::cli::parser::DocCmd;
use crate::core::documents::{DocumentFilter, DocumentLogic, UploadRequest};
use crate::core::enrich::EnrichOutcome;
use crate::errors::{AppError, AppResult};
use crate::models::document::{Document, DocumentStatus};
use crate::ui::messages;
use crate::utils::colors::{colorize_optional, colorize_status};
use crate::utils::date::{parse_date, today};
use crate::utils::table::Table;
use std::fs;

pub fn handle(cmd: &DocCmd, ctx: &AppContext) -> AppResult<()> {
    let exec = &ctx.exec;

    match cmd {
        DocCmd::Upload {
            file,
            description,
            creds,
        } => {
            let user = login(ctx, creds)?;
            let bytes = fs::read(file)?;
            let filename = file
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .ok_or_else(|| AppError::InvalidInput(format!("not a file: {}", file.display())))?;

            let req = UploadRequest {
                filename: &filename,
                bytes: &bytes,
                description: description.as_deref(),
            };
            let result = DocumentLogic::upload(exec, &user, &req, &ctx.enricher)?;

            if ctx.json {
                return messages::json(&result);
            }
            messages::success(format!(
                "Uploaded '{}' as document {} ({} bytes, Pending)",
                result.document.filename,
                result.document.id,
                result.document.file_size.unwrap_or(0)
            ));
            match &result.enrichment {
                EnrichOutcome::Skipped => messages::info("No text found, enrichment skipped."),
                EnrichOutcome::Success {
                    classification,
                    entities,
                } => messages::info(format!(
                    "Classified as '{classification}', {} entity label(s) found",
                    entities.len()
                )),
                EnrichOutcome::Failed { reason } => {
                    messages::warning(format!("Enrichment failed: {reason}"))
                }
            }
        }

        DocCmd::List { creds } => {
            let user = login(ctx, creds)?;
            let docs = DocumentLogic::list_for_user(exec, user.id)?;
            print_documents(ctx, &docs)?;
        }

        DocCmd::Pending { creds } => {
            let manager = login(ctx, creds)?;
            let docs = DocumentLogic::pending(exec, &manager)?;
            print_documents(ctx, &docs)?;
        }

        DocCmd::Show { id, creds } => {
            let viewer = login(ctx, creds)?;
            let details = DocumentLogic::details(exec, &viewer, *id)?;
            if ctx.json {
                return messages::json(&details);
            }

            let d = &details.document;
            messages::header(format!("Document {} - {}", d.id, d.filename));
            println!("Status        : {}", colorize_status(d.status));
            println!("Uploaded by   : {}", d.uploader_name);
            println!("Uploaded at   : {}", d.upload_date);
            println!("Last modified : {}", d.last_modified);
            println!("Type / size   : {} / {} bytes", colorize_optional(d.file_type.as_deref()), d.file_size.unwrap_or(0));
            println!("Description   : {}", colorize_optional(d.description.as_deref()));
            println!("Tags          : {}", details.tags.join(", "));
            println!("Metadata      : {}", details.metadata);

            if !details.comments.is_empty() {
                println!();
                let mut t = Table::new(&["When", "Who", "Comment"]);
                for c in &details.comments {
                    t.add_row(vec![c.created_at.clone(), c.full_name.clone(), c.comment_text.clone()]);
                }
                print!("{}", t.render());
            }
        }

        DocCmd::Approve { id, creds } => {
            let manager = login(ctx, creds)?;
            let doc = DocumentLogic::approve(exec, &manager, *id)?;
            print_one(ctx, &doc, "approved")?;
        }

        DocCmd::Reject { id, creds } => {
            let manager = login(ctx, creds)?;
            let doc = DocumentLogic::reject(exec, &manager, *id)?;
            print_one(ctx, &doc, "rejected")?;
        }

        DocCmd::Search {
            query,
            status,
            file_type,
            date,
            all,
            creds,
        } => {
            let user = login(ctx, creds)?;
            if *all && !user.role.is_manager() {
                return Err(AppError::PermissionDenied(
                    "only managers can search every user's documents".into(),
                ));
            }

            let status = match status.as_deref() {
                Some(s) => Some(
                    DocumentStatus::parse(s)
                        .ok_or_else(|| AppError::InvalidInput(format!("unknown status: {s}")))?,
                ),
                None => None,
            };
            let date = date.as_deref().map(parse_date).transpose()?;

            let filter = DocumentFilter {
                query: query.clone(),
                status,
                file_type: file_type.clone(),
                date,
            };
            let owner = if *all { None } else { Some(user.id) };
            let docs = DocumentLogic::search(exec, owner, &filter)?;
            print_documents(ctx, &docs)?;
        }

        DocCmd::Comment { id, text, creds } => {
            let user = login(ctx, creds)?;
            let comment = DocumentLogic::add_comment(exec, &user, *id, text)?;
            if ctx.json {
                return messages::json(&comment);
            }
            messages::success(format!("Comment added to document {id}"));
        }

        DocCmd::Delete { id, creds } => {
            let user = login(ctx, creds)?;
            DocumentLogic::delete(exec, &user, *id)?;
            if ctx.json {
                return messages::json(&serde_json::json!({ "deleted": id }));
            }
            messages::success(format!("Document {id} deleted"));
        }

        DocCmd::Describe { id, text, creds } => {
            let user = login(ctx, creds)?;
            let doc = DocumentLogic::update_description(exec, &user, *id, text)?;
            print_one(ctx, &doc, "updated")?;
        }

        DocCmd::Stats { creds } => {
            let user = login(ctx, creds)?;
            let stats = DocumentLogic::user_stats(exec, user.id, today())?;
            if ctx.json {
                return messages::json(&stats);
            }
            messages::header(format!("Documents of {}", user.full_name));
            println!("Total           : {}", stats.total_documents);
            println!("Uploaded today  : {}", stats.uploaded_today);
            println!("Pending review  : {}", stats.pending_approval);
        }

        DocCmd::Status => {
            let counts = DocumentLogic::status_counts(exec)?;
            if ctx.json {
                return messages::json(&counts);
            }
            let mut t = Table::new(&["Status", "Documents"]);
            t.add_row(vec![colorize_status(DocumentStatus::Pending), counts.pending.to_string()]);
            t.add_row(vec![colorize_status(DocumentStatus::Approved), counts.approved.to_string()]);
            t.add_row(vec![colorize_status(DocumentStatus::Rejected), counts.rejected.to_string()]);
            print!("{}", t.render());
        }

        DocCmd::Activity { limit, idp } => {
            if *idp {
                let log = DocumentLogic::idp_log(exec, *limit)?;
                if ctx.json {
                    return messages::json(&log);
                }
                let mut t = Table::new(&["Document", "Status", "Classification"]);
                for e in &log {
                    t.add_row(vec![e.doc.clone(), e.status.clone(), colorize_optional(e.action.as_deref())]);
                }
                print!("{}", t.render());
            } else {
                let docs = DocumentLogic::recent_activity(exec, *limit)?;
                print_documents(ctx, &docs)?;
            }
        }
    }

    Ok(())
}

fn print_one(ctx: &AppContext, doc: &Document, verb: &str) -> AppResult<()> {
    if ctx.json {
        return messages::json(doc);
    }
    messages::success(format!("Document {} {verb} ({})", doc.id, colorize_status(doc.status)));
    Ok(())
}

fn print_documents(ctx: &AppContext, docs: &[Document]) -> AppResult<()> {
    if ctx.json {
        return messages::json(docs);
    }
    if docs.is_empty() {
        messages::info("No documents found.");
        return Ok(());
    }

    let mut t = Table::new(&["ID", "Filename", "Uploader", "Status", "Uploaded", "Type"]);
    for d in docs {
        t.add_row(vec![
            d.id.to_string(),
            d.filename.clone(),
            d.uploader_name.clone(),
            colorize_status(d.status),
            d.upload_date.clone(),
            colorize_optional(d.file_type.as_deref()),
        ]);
    }
    print!("{}", t.render());
    Ok(())
}
