use crate::classify::{classify_link, Confidence, LinkClass};
use crate::crawler::fetcher::{FetchResult, Fetcher, ProbeOutcome};
use crate::crawler::frontier::TaskLease;
use crate::crawler::parser::{parse_html, DiscoveredLink, LinkKind};
use crate::crawler::session::Session;
use crate::state::PdfStatus;
use crate::url::canonicalize;
use crate::TrawlError;
use std::sync::Arc;
use url::Url;

/// One member of the fetch worker pool
///
/// Pops tasks until the frontier closes or the session is cancelled. Every
/// dequeued task counts as processed whatever its outcome.
pub(crate) async fn run_worker(id: usize, session: Arc<Session>, fetcher: Fetcher) {
    tracing::trace!(worker = id, "Worker started");

    loop {
        if session.cancel.is_cancelled() {
            break;
        }

        let lease = tokio::select! {
            biased;
            _ = session.cancel.cancelled() => break,
            lease = session.frontier.pop() => match lease {
                Some(lease) => lease,
                None => break,
            },
        };

        session.count_processed();
        tracing::debug!(worker = id, depth = lease.depth, "Processing URL: {}", lease.url);

        let result = tokio::select! {
            biased;
            _ = session.cancel.cancelled() => break,
            result = fetcher.fetch_page(&lease.url) => result,
        };

        match result {
            FetchResult::Html { final_url, body } => {
                let page_url = canonicalize(final_url).unwrap_or_else(|_| lease.url.clone());
                if page_url != lease.url && !session.visited.try_claim(&page_url) {
                    tracing::debug!(
                        "{} redirected to {}, which is already claimed",
                        lease.url,
                        page_url
                    );
                    continue;
                }
                process_page(&session, &fetcher, &lease, &page_url, &body).await;
            }
            FetchResult::Pdf {
                final_url,
                content_type,
            } => {
                tracing::debug!("{} served a PDF (via {})", lease.url, final_url);
                let source = lease.referrer.as_ref().unwrap_or(&lease.url);
                session.record_pdf(&lease.url, source, PdfStatus::Found, Some(content_type));
            }
            FetchResult::NotHtml { content_type } => {
                tracing::debug!("Skipping {} (content type {})", lease.url, content_type);
            }
            FetchResult::HttpError { status_code } => {
                log_fetch_failure(&lease.url, format!("HTTP {}", status_code));
            }
            FetchResult::NetworkError { error } => log_fetch_failure(&lease.url, error),
        }
    }

    tracing::trace!(worker = id, "Worker exiting");
}

/// Fetch failures stay local to their task
fn log_fetch_failure(url: &Url, message: String) {
    let error = TrawlError::FetchFailure {
        url: url.to_string(),
        message,
    };
    tracing::warn!("{}", error);
}

/// Classifies every link on a fetched page
async fn process_page(
    session: &Session,
    fetcher: &Fetcher,
    lease: &TaskLease,
    page_url: &Url,
    body: &str,
) {
    let parsed = parse_html(body, page_url);
    tracing::debug!(
        "Parsed {} ({} links, title {:?})",
        page_url,
        parsed.links.len(),
        parsed.title
    );

    for DiscoveredLink { url, kind } in parsed.links {
        if session.cancel.is_cancelled() {
            return;
        }

        match classify_link(&url, kind) {
            LinkClass::Pdf(Confidence::Tentative) => {
                handle_tentative(session, fetcher, lease, page_url, url, kind).await;
            }
            LinkClass::Pdf(confidence) => {
                session.record_pdf(&url, page_url, confidence.initial_status(), None);
            }
            LinkClass::Page => enqueue_page(session, lease, url),
            LinkClass::Ignore => {
                tracing::trace!("Ignoring embedded {}", url);
            }
        }
    }
}

/// Probes a URL that only looks like a PDF
async fn handle_tentative(
    session: &Session,
    fetcher: &Fetcher,
    lease: &TaskLease,
    page_url: &Url,
    url: Url,
    kind: LinkKind,
) {
    if session.ledger.get(url.as_str()).is_some() || session.visited.contains(&url) {
        return;
    }

    let tentative = Confidence::Tentative.initial_status();
    if !session.probe_unverified {
        session.record_pdf(&url, page_url, tentative, None);
        return;
    }

    let outcome = tokio::select! {
        biased;
        _ = session.cancel.cancelled() => return,
        outcome = fetcher.probe(&url) => outcome,
    };

    match outcome {
        ProbeOutcome::Pdf(content_type) => {
            session.record_pdf(&url, page_url, PdfStatus::Found, Some(content_type));
        }
        ProbeOutcome::NotPdf(content_type) => {
            tracing::debug!("{} is not a PDF ({})", url, content_type);
            if kind == LinkKind::Anchor {
                enqueue_page(session, lease, url);
            }
        }
        ProbeOutcome::Unknown(reason) => {
            tracing::debug!("Probe inconclusive for {}: {}", url, reason);
            session.record_pdf(&url, page_url, tentative, None);
        }
    }
}

/// Claims an in-scope page and queues it one level deeper
///
/// The claim comes before the depth check, so a URL first seen at the depth
/// limit is claimed once and never reconsidered.
fn enqueue_page(session: &Session, lease: &TaskLease, url: Url) {
    if !session.scope.allows(&url) {
        tracing::trace!("Out of scope: {}", url);
        return;
    }

    if !session.visited.try_claim(&url) {
        return;
    }

    if lease.depth + 1 > session.frontier.max_depth() {
        tracing::trace!("Depth limit reached, not following {}", url);
        return;
    }

    let task = lease.child(url);
    tracing::trace!(depth = task.depth, "Queued {}", task.url);
    session.frontier.push(task);
}
