//! Scripted playback for the diagnostics and deployment overlays.
//!
//! The player watches the state store. Each time a new overlay becomes
//! active it starts that overlay's script and aborts whatever script was
//! running before. Script writes carry the overlay id, so a line scheduled
//! for a dismissed overlay never lands on its successor.

use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::ui_state::{DeploymentStatus, EnvKind, OverlayKind, UiState, UiStateStore};

const DIAGNOSTIC_LINES: [&str; 10] = [
    "Initializing diagnostic sequence...",
    "CPU: 16 cores online, load 0.42",
    "Memory integrity check: OK (64 GB)",
    "Scanning network interfaces...",
    "eth0: link up, 10 Gbps full duplex",
    "Inference gateway latency: 182 ms",
    "Vector store: 12,480 embeddings indexed",
    "Container runtime: 23 services healthy",
    "Firewall ruleset verified",
    "All systems nominal.",
];

// Index of the deployment line after which the environment reports healthy.
const DEPLOY_HEALTH_LINE: usize = 15;

#[derive(Debug, Clone, Copy)]
pub struct OverlayTiming {
    pub diagnostics_step: Duration,
    pub diagnostics_linger: Duration,
    pub deploy_step: Duration,
}

impl Default for OverlayTiming {
    fn default() -> Self {
        Self {
            diagnostics_step: Duration::from_millis(400),
            diagnostics_linger: Duration::from_secs(2),
            deploy_step: Duration::from_millis(600),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Step {
    Log(String),
    Status(DeploymentStatus),
    Close,
}

#[derive(Debug, Clone, PartialEq)]
struct Cue {
    delay: Duration,
    step: Step,
}

impl Cue {
    fn after(delay: Duration, step: Step) -> Self {
        Self { delay, step }
    }

    fn now(step: Step) -> Self {
        Self::after(Duration::ZERO, step)
    }
}

fn diagnostics_script(duration_secs: Option<f64>, timing: &OverlayTiming) -> Vec<Cue> {
    let step = duration_secs
        .filter(|d| d.is_finite() && *d > 0.0)
        .map(|d| Duration::from_secs_f64(d / DIAGNOSTIC_LINES.len() as f64))
        .unwrap_or(timing.diagnostics_step);

    let mut script: Vec<Cue> = DIAGNOSTIC_LINES
        .iter()
        .map(|line| Cue::after(step, Step::Log(line.to_string())))
        .collect();
    script.push(Cue::after(timing.diagnostics_linger, Step::Close));
    script
}

/// Terraform-then-Docker provisioning transcript for a demo environment.
fn deployment_lines(env: EnvKind) -> Vec<String> {
    let env = env.as_str();
    vec![
        format!("Initializing Terraform backend for module: {env}_infrastructure..."),
        "[aws] Refreshing state... id=i-04a1b2c3d4e5f6g7h".to_string(),
        "[aws] Found existing VPC: vpc-0a1b2c3d".to_string(),
        "Plan: 4 to add, 0 to change, 0 to destroy.".to_string(),
        format!("aws_instance.{env}_node: Creating..."),
        format!("aws_instance.{env}_node: Still creating... [10s elapsed]"),
        format!("aws_instance.{env}_node: Still creating... [20s elapsed]"),
        format!(
            "aws_instance.{env}_node: Creation complete after 22s [id=i-1234567890abcdef0]"
        ),
        "aws_security_group_rule.allow_ssh: Creating...".to_string(),
        "aws_security_group_rule.allow_ssh: Creation complete".to_string(),
        "Provisioning Docker containers...".to_string(),
        format!("Pulling image: ericdennis/{env}-core:latest..."),
        "Digest: sha256:7b0a...".to_string(),
        format!("Status: Downloaded newer image for {env}-core:latest"),
        "Starting service...".to_string(),
        "Health check passed: HTTP 200 OK".to_string(),
        "Apply complete! Resources: 4 added, 0 changed, 0 destroyed.".to_string(),
        format!("Outputs: endpoint = \"https://{env}-api.ericdennis.dev\""),
    ]
}

fn deployment_script(env: EnvKind, timing: &OverlayTiming) -> Vec<Cue> {
    let mut script = Vec::new();
    for (index, line) in deployment_lines(env).into_iter().enumerate() {
        script.push(Cue::after(timing.deploy_step, Step::Log(line)));
        if index == DEPLOY_HEALTH_LINE {
            script.push(Cue::now(Step::Status(DeploymentStatus::Active)));
        }
    }
    script.push(Cue::now(Step::Status(DeploymentStatus::Complete)));
    script
}

fn script_for(kind: &OverlayKind, timing: &OverlayTiming) -> Option<Vec<Cue>> {
    match kind {
        OverlayKind::Diagnostics { duration_secs } => Some(diagnostics_script(*duration_secs, timing)),
        OverlayKind::DeploymentConsole { env, .. } => Some(deployment_script(*env, timing)),
        OverlayKind::ArchitectureDiagram { .. } => None,
    }
}

// Aborts the playback task when dropped.
struct ScriptTask(JoinHandle<()>);

impl Drop for ScriptTask {
    fn drop(&mut self) {
        self.0.abort();
    }
}

async fn play(store: UiStateStore, id: u64, script: Vec<Cue>) {
    for cue in script {
        if !cue.delay.is_zero() {
            tokio::time::sleep(cue.delay).await;
        }
        let applied = match cue.step {
            Step::Log(line) => store.append_overlay_log(id, line),
            Step::Status(status) => store.set_deployment_status(id, status),
            Step::Close => store.close_overlay_if(id),
        };
        if !applied {
            debug!(overlay_id = id, "Overlay gone, stopping playback");
            return;
        }
    }
}

pub struct OverlayPlayer {
    store: UiStateStore,
    timing: OverlayTiming,
}

impl OverlayPlayer {
    pub fn new(store: UiStateStore) -> Self {
        Self {
            store,
            timing: OverlayTiming::default(),
        }
    }

    /// Starts watching the store. Aborting the returned task also aborts any
    /// script it is running.
    pub fn spawn(self) -> JoinHandle<()> {
        let updates = self.store.subscribe();
        tokio::spawn(self.run(updates))
    }

    async fn run(self, mut updates: watch::Receiver<UiState>) {
        let mut playing: Option<u64> = None;
        let mut task: Option<ScriptTask> = None;

        loop {
            let overlay = updates.borrow_and_update().overlay.clone();
            let active = overlay.as_ref().map(|overlay| overlay.id);

            if active != playing {
                // Replacing the guard aborts the previous script.
                task = overlay.and_then(|overlay| {
                    let script = script_for(&overlay.kind, &self.timing)?;
                    debug!(overlay_id = overlay.id, overlay = %overlay.kind.label(), "Starting overlay script");
                    Some(ScriptTask(tokio::spawn(play(
                        self.store.clone(),
                        overlay.id,
                        script,
                    ))))
                });
                playing = active;
            }

            if updates.changed().await.is_err() {
                break;
            }
        }

        drop(task);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui_state::ArchitectureKind;
    use tokio::time::sleep;

    fn start() -> (UiStateStore, JoinHandle<()>) {
        let store = UiStateStore::new();
        let player = OverlayPlayer::new(store.clone()).spawn();
        (store, player)
    }

    fn deploy(env: EnvKind) -> OverlayKind {
        OverlayKind::DeploymentConsole {
            env,
            status: DeploymentStatus::Deploying,
        }
    }

    #[test]
    fn deployment_script_shape() {
        let script = deployment_script(EnvKind::Cluster, &OverlayTiming::default());
        let logs = script
            .iter()
            .filter(|cue| matches!(cue.step, Step::Log(_)))
            .count();
        assert_eq!(logs, 18);
        assert_eq!(
            script[DEPLOY_HEALTH_LINE + 1].step,
            Step::Status(DeploymentStatus::Active)
        );
        assert_eq!(
            script.last().map(|cue| &cue.step),
            Some(&Step::Status(DeploymentStatus::Complete))
        );
        assert_eq!(
            script[0].step,
            Step::Log("Initializing Terraform backend for module: cluster_infrastructure...".into())
        );
        assert_eq!(
            script[DEPLOY_HEALTH_LINE].step,
            Step::Log("Health check passed: HTTP 200 OK".into())
        );
        assert!(matches!(
            &script.iter().rev().nth(1).map(|cue| &cue.step),
            Some(Step::Log(line)) if line.ends_with("\"https://cluster-api.ericdennis.dev\"")
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn deployment_goes_active_then_complete() {
        let (store, player) = start();
        store.set_overlay(Some(deploy(EnvKind::Agent)));

        sleep(Duration::from_millis(5_000)).await;
        let overlay = store.get_state().overlay.unwrap();
        assert_eq!(overlay.kind, deploy(EnvKind::Agent));
        assert_eq!(overlay.log.len(), 8);

        sleep(Duration::from_millis(5_000)).await;
        let overlay = store.get_state().overlay.unwrap();
        assert_eq!(overlay.log.len(), 16);
        assert!(matches!(
            overlay.kind,
            OverlayKind::DeploymentConsole {
                status: DeploymentStatus::Active,
                ..
            }
        ));

        sleep(Duration::from_millis(1_000)).await;
        let overlay = store.get_state().overlay.unwrap();
        assert_eq!(overlay.log.len(), 18);
        assert!(matches!(
            overlay.kind,
            OverlayKind::DeploymentConsole {
                status: DeploymentStatus::Complete,
                ..
            }
        ));

        // The console stays up until someone closes it.
        sleep(Duration::from_secs(30)).await;
        assert!(store.get_state().overlay.is_some());
        player.abort();
    }

    #[tokio::test(start_paused = true)]
    async fn diagnostics_closes_itself() {
        let (store, player) = start();
        store.set_overlay(Some(OverlayKind::Diagnostics {
            duration_secs: None,
        }));

        sleep(Duration::from_millis(5_000)).await;
        let overlay = store.get_state().overlay.unwrap();
        assert_eq!(overlay.log.len(), DIAGNOSTIC_LINES.len());

        sleep(Duration::from_millis(1_500)).await;
        assert!(store.get_state().overlay.is_none());
        player.abort();
    }

    #[tokio::test(start_paused = true)]
    async fn diagnostics_duration_scales_playback() {
        let (store, player) = start();
        store.set_overlay(Some(OverlayKind::Diagnostics {
            duration_secs: Some(1.0),
        }));

        sleep(Duration::from_millis(550)).await;
        assert_eq!(store.get_state().overlay.unwrap().log.len(), 5);

        sleep(Duration::from_millis(3_000)).await;
        assert!(store.get_state().overlay.is_none());
        player.abort();
    }

    #[tokio::test(start_paused = true)]
    async fn manual_close_cancels_playback() {
        let (store, player) = start();
        store.set_overlay(Some(deploy(EnvKind::Database)));
        sleep(Duration::from_millis(1_300)).await;
        assert!(store.close_overlay());

        let id = store
            .set_overlay(Some(OverlayKind::ArchitectureDiagram {
                system: ArchitectureKind::HybridCloud,
            }))
            .unwrap();
        sleep(Duration::from_secs(20)).await;

        let overlay = store.get_state().overlay.unwrap();
        assert_eq!(overlay.id, id);
        assert!(overlay.log.is_empty());
        player.abort();
    }

    #[tokio::test(start_paused = true)]
    async fn replaced_overlay_gets_its_own_script() {
        let (store, player) = start();
        store.set_overlay(Some(deploy(EnvKind::Cluster)));
        sleep(Duration::from_millis(1_300)).await;

        store.set_overlay(Some(OverlayKind::Diagnostics {
            duration_secs: None,
        }));
        sleep(Duration::from_millis(1_000)).await;

        let overlay = store.get_state().overlay.unwrap();
        assert_eq!(overlay.log, DIAGNOSTIC_LINES[..2].to_vec());
        player.abort();
    }

    #[tokio::test(start_paused = true)]
    async fn aborting_player_stops_scripts() {
        let (store, player) = start();
        store.set_overlay(Some(deploy(EnvKind::Agent)));
        sleep(Duration::from_millis(700)).await;

        player.abort();
        let _ = player.await;
        sleep(Duration::from_secs(20)).await;

        assert_eq!(store.get_state().overlay.unwrap().log.len(), 1);
    }
}
