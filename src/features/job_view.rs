//! Status area shared by every job-driven tool.

use super::HandlerKind;
use crate::artifact::{format_file_size, ArtifactStore};
use crate::job::{Collection, JobOutput, JobStatus};
use crate::state::ToolSession;
use crate::ui::{error_panel, node, Button, Card, Download, Progress, Text, TextInput};
use rust_i18n::t;
use serde_json::Value;

pub fn render_job(
    session: &ToolSession,
    kind: HandlerKind,
    artifacts: &ArtifactStore,
    locale: &str,
) -> Vec<Value> {
    let labels = kind.labels();
    let cancel = t!("job.cancel", locale = locale);
    let clear = t!("job.clear", locale = locale);
    let mut out = Vec::new();

    match session.job.status() {
        JobStatus::Idle | JobStatus::Validating => {}
        JobStatus::Running { progress } => {
            let bar = if kind.is_remote() {
                Progress::new().text(labels.busy)
            } else {
                Progress::new().value(*progress).text(labels.busy)
            };
            out.push(node(bar));
            out.push(node(Button::new(&cancel, "cancel_job")));
        }
        JobStatus::Preparing { remaining_secs } => {
            let preparing = t!("job.preparing", locale = locale);
            let countdown = t!("job.countdown", locale = locale, seconds = remaining_secs);
            let ad = t!("job.ad_notice", locale = locale);
            out.push(node(
                Card::new(vec![
                    node(Text::new(&countdown)),
                    node(Text::new(&ad).size(12.0).tone("muted")),
                    node(Progress::new().text(&preparing)),
                ])
                .title(&preparing),
            ));
            out.push(node(Button::new(&cancel, "cancel_job")));
        }
        JobStatus::Ready(output) => {
            out.push(node(Text::new(labels.success).size(18.0).tone("success")));
            match output {
                JobOutput::Download(handle) => match artifacts.get(*handle) {
                    Some(artifact) => {
                        let size = format!(
                            "{} ({})",
                            artifact.filename,
                            format_file_size(artifact.size())
                        );
                        out.push(node(Text::new(&size).size(12.0).tone("muted")));
                        out.push(node(Download::new(
                            labels.download,
                            handle.to_string(),
                            &artifact.filename,
                            &artifact.mime,
                        )));
                    }
                    None => out.push(error_panel(
                        &format!("artifact_revoked:{handle}"),
                        "resource_error",
                    )),
                },
                JobOutput::Text(text) => {
                    out.push(node(TextInput::new("output_text").text(text).read_only(true)));
                    let copy = if session.copied {
                        t!("job.copied", locale = locale)
                    } else {
                        t!("job.copy", locale = locale)
                    };
                    out.push(node(
                        Button::new(&copy, "copy_output")
                            .id("copy_output")
                            .copy_text(text),
                    ));
                }
                JobOutput::Collection(collection) => out.extend(render_collection(collection)),
            }
            let again = if matches!(output, JobOutput::Download(_)) {
                t!("job.start_over", locale = locale)
            } else {
                clear.clone()
            };
            out.push(node(Button::new(&again, "clear_job").id("clear_job")));
        }
        JobStatus::Cancelled => {
            let cancelled = t!("job.cancelled", locale = locale);
            out.push(node(Text::new(&cancelled).tone("muted")));
        }
        JobStatus::Failed(err) => {
            out.push(error_panel(&err.to_string(), err.kind()));
        }
    }
    out
}

fn render_collection(collection: &Collection) -> Vec<Value> {
    let mut out = vec![node(Text::new(&collection.title).size(16.0))];
    if let Some(subtitle) = &collection.subtitle {
        out.push(node(Text::new(subtitle).tone("muted")));
    }
    for item in &collection.items {
        out.push(node(
            Card::new(vec![
                node(Text::new(&item.detail).size(12.0).tone("muted")),
                node(Text::new(&item.download_name).size(12.0)),
            ])
            .title(&item.title)
            .image_url(&item.thumbnail_url),
        ));
    }
    if let Some(bundle) = &collection.bundle_name {
        let label = format!("Download All ({bundle})");
        out.push(node(Text::new(&label).tone("success")));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifact::Artifact;
    use crate::job::{settle, Deliverable, JobEvent, JobRunner, JobSpec, JobUpdate, SimulatedWork};
    use crate::registry::ToolKey;

    fn dump(nodes: &[Value]) -> String {
        serde_json::to_string(nodes).unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn countdown_shows_seconds_and_cancel() {
        let mut runner = JobRunner::new(tokio::runtime::Handle::current());
        let mut session = ToolSession::mount(ToolKey::Mp4ToMp3);
        assert!(session.job.begin());
        let spec = JobSpec::simulated(SimulatedWork::converter(250, 3000, 5), || {
            Ok(Deliverable::Text("unused".into()))
        });
        let ticket = runner.launch(spec);
        let id = ticket.id();
        session.job.attach(ticket);
        for update in [JobUpdate::Progress(100), JobUpdate::Preparing(3)] {
            session.job.apply(JobEvent { job_id: id, update });
        }
        let kind = session.handler.unwrap();
        let nodes = render_job(&session, kind, &ArtifactStore::new(), "en");
        let text = dump(&nodes);
        assert!(text.contains("Your download will start in 3 seconds."));
        assert!(text.contains("cancel_job"));
    }

    #[test]
    fn ready_download_offers_handle() {
        let mut session = ToolSession::mount(ToolKey::TextToPdf);
        let mut artifacts = ArtifactStore::new();
        settle(
            &mut session.job,
            Deliverable::Artifact(Artifact::new(b"%PDF".to_vec(), "application/pdf", "converted-text.pdf")),
            &mut artifacts,
        );
        let kind = session.handler.unwrap();
        let text = dump(&render_job(&session, kind, &artifacts, "en"));
        assert!(text.contains("fetch_artifact"));
        assert!(text.contains("converted-text.pdf"));
        assert!(text.contains("clear_job"));
    }

    #[test]
    fn text_output_has_copy_button_in_locale() {
        let mut session = ToolSession::mount(ToolKey::Translator);
        let mut artifacts = ArtifactStore::new();
        settle(&mut session.job, Deliverable::Text("Hola".into()), &mut artifacts);
        let kind = session.handler.unwrap();
        let en = dump(&render_job(&session, kind, &artifacts, "en"));
        assert!(en.contains("\"copy_text\":\"Hola\""));
        assert!(en.contains("\"Copy\""));
        session.copied = true;
        let is = dump(&render_job(&session, kind, &artifacts, "is"));
        assert!(is.contains("Afritað!"));
    }
}
