//! Scripted collaborators for driving the orchestrator end to end
//!
//! Every collaborator answers from a script that the test can change between
//! cycles. One effect kind can be held at a gate so the test observes the
//! state that launched it before the outcome arrives.

#![allow(dead_code)]

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::collections::BTreeSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Semaphore;

use mediaflow::workflow::{
    Collaborators, DirectoryScanner, EffectKind, ErrorNotifier, EvaluationReport, FileEvaluator,
    FileMover, PermissionChecker, PermissionFailure, PermissionReport, WorkflowSnapshot,
};

pub fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

struct Script {
    scan: Result<Vec<String>, String>,
    permissions: Result<PermissionReport, Vec<String>>,
    evaluation: Result<Vec<String>, String>,
    moving: Result<(), String>,
    held: Option<EffectKind>,
}

impl Default for Script {
    fn default() -> Self {
        Self {
            scan: Ok(Vec::new()),
            permissions: Ok(PermissionReport::default()),
            evaluation: Ok(Vec::new()),
            moving: Ok(()),
            held: None,
        }
    }
}

#[derive(Default)]
struct Recorded {
    calls: Vec<EffectKind>,
    permission_inputs: Vec<Vec<String>>,
    evaluation_inputs: Vec<(Vec<String>, BTreeSet<String>)>,
    moves: Vec<(Vec<String>, String)>,
    reports: Vec<Vec<String>>,
}

struct Inner {
    script: Mutex<Script>,
    recorded: Mutex<Recorded>,
    gate: Semaphore,
}

/// One fake library implementing all five collaborator traits
#[derive(Clone)]
pub struct ScriptedLibrary {
    inner: Arc<Inner>,
}

impl Default for ScriptedLibrary {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptedLibrary {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Inner {
                script: Mutex::new(Script::default()),
                recorded: Mutex::new(Recorded::default()),
                gate: Semaphore::new(0),
            }),
        }
    }

    pub fn collaborators(&self) -> Collaborators {
        Collaborators::new(
            self.clone(),
            self.clone(),
            self.clone(),
            self.clone(),
            self.clone(),
        )
    }

    pub fn scan_resolves(&self, directories: &[&str]) -> &Self {
        self.inner.script.lock().unwrap().scan = Ok(strings(directories));
        self
    }

    pub fn scan_rejects(&self, reason: &str) -> &Self {
        self.inner.script.lock().unwrap().scan = Err(reason.to_string());
        self
    }

    pub fn permissions_resolve(&self, dirs_to_evaluate: &[&str], dirs_to_report: &[&str]) -> &Self {
        self.inner.script.lock().unwrap().permissions = Ok(PermissionReport {
            dirs_to_evaluate: strings(dirs_to_evaluate),
            dirs_to_report: strings(dirs_to_report),
        });
        self
    }

    pub fn permissions_reject(&self, dirs_to_report: &[&str]) -> &Self {
        self.inner.script.lock().unwrap().permissions = Err(strings(dirs_to_report));
        self
    }

    pub fn evaluation_resolves(&self, dirs_to_move: &[&str]) -> &Self {
        self.inner.script.lock().unwrap().evaluation = Ok(strings(dirs_to_move));
        self
    }

    pub fn evaluation_rejects(&self, reason: &str) -> &Self {
        self.inner.script.lock().unwrap().evaluation = Err(reason.to_string());
        self
    }

    pub fn move_resolves(&self) -> &Self {
        self.inner.script.lock().unwrap().moving = Ok(());
        self
    }

    pub fn move_rejects(&self, reason: &str) -> &Self {
        self.inner.script.lock().unwrap().moving = Err(reason.to_string());
        self
    }

    /// Make effects of `kind` wait for [`ScriptedLibrary::release`]
    pub fn hold(&self, kind: EffectKind) -> &Self {
        self.inner.script.lock().unwrap().held = Some(kind);
        self
    }

    /// Let one held effect through and stop holding new ones
    pub fn release(&self) {
        self.inner.script.lock().unwrap().held = None;
        self.inner.gate.add_permits(1);
    }

    pub fn calls(&self) -> Vec<EffectKind> {
        self.inner.recorded.lock().unwrap().calls.clone()
    }

    pub fn permission_inputs(&self) -> Vec<Vec<String>> {
        self.inner.recorded.lock().unwrap().permission_inputs.clone()
    }

    pub fn evaluation_inputs(&self) -> Vec<(Vec<String>, BTreeSet<String>)> {
        self.inner.recorded.lock().unwrap().evaluation_inputs.clone()
    }

    pub fn moves(&self) -> Vec<(Vec<String>, String)> {
        self.inner.recorded.lock().unwrap().moves.clone()
    }

    pub fn reports(&self) -> Vec<Vec<String>> {
        self.inner.recorded.lock().unwrap().reports.clone()
    }

    /// Notifications run detached from the machine, so poll for them
    pub async fn wait_for_reports(&self, count: usize) -> Vec<Vec<String>> {
        tokio::time::timeout(Duration::from_secs(5), async {
            loop {
                let reports = self.reports();
                if reports.len() >= count {
                    return reports;
                }
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("notification was never delivered")
    }

    async fn enter(&self, kind: EffectKind) {
        self.inner.recorded.lock().unwrap().calls.push(kind);
        let held = self.inner.script.lock().unwrap().held == Some(kind);
        if held {
            self.inner
                .gate
                .acquire()
                .await
                .expect("gate closed")
                .forget();
        }
    }
}

#[async_trait]
impl DirectoryScanner for ScriptedLibrary {
    async fn scan_directories(&self, _base_path: &str) -> Result<Vec<String>> {
        self.enter(EffectKind::Scan).await;
        let scan = self.inner.script.lock().unwrap().scan.clone();
        scan.map_err(|reason| anyhow!(reason))
    }
}

#[async_trait]
impl PermissionChecker for ScriptedLibrary {
    async fn check_file_permissions(
        &self,
        directories: &[String],
    ) -> std::result::Result<PermissionReport, PermissionFailure> {
        self.inner
            .recorded
            .lock()
            .unwrap()
            .permission_inputs
            .push(directories.to_vec());
        self.enter(EffectKind::CheckPermissions).await;
        let permissions = self.inner.script.lock().unwrap().permissions.clone();
        permissions.map_err(PermissionFailure::new)
    }
}

#[async_trait]
impl FileEvaluator for ScriptedLibrary {
    async fn evaluate_files(
        &self,
        directories: &[String],
        accepted_file_types: &BTreeSet<String>,
    ) -> Result<EvaluationReport> {
        self.inner
            .recorded
            .lock()
            .unwrap()
            .evaluation_inputs
            .push((directories.to_vec(), accepted_file_types.clone()));
        self.enter(EffectKind::Evaluate).await;
        let evaluation = self.inner.script.lock().unwrap().evaluation.clone();
        evaluation
            .map(|dirs_to_move| EvaluationReport { dirs_to_move })
            .map_err(|reason| anyhow!(reason))
    }
}

#[async_trait]
impl FileMover for ScriptedLibrary {
    async fn move_files(&self, files: &[String], destination_path: &str) -> Result<()> {
        self.inner
            .recorded
            .lock()
            .unwrap()
            .moves
            .push((files.to_vec(), destination_path.to_string()));
        self.enter(EffectKind::Move).await;
        let moving = self.inner.script.lock().unwrap().moving.clone();
        moving.map_err(|reason| anyhow!(reason))
    }
}

#[async_trait]
impl ErrorNotifier for ScriptedLibrary {
    async fn notify_errors(&self, dirs_to_report: &[String]) -> Result<()> {
        let mut recorded = self.inner.recorded.lock().unwrap();
        recorded.calls.push(EffectKind::NotifyErrors);
        recorded.reports.push(dirs_to_report.to_vec());
        Ok(())
    }
}

/// Number of transitions in one clean pass from idle back to idle
pub const FULL_CYCLE: usize = 5;

pub fn completed_cycles(snapshot: &WorkflowSnapshot, cycles: usize) -> bool {
    snapshot.transitions_count == cycles * FULL_CYCLE
}
