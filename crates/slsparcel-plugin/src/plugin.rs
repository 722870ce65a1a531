//! Build/relocate orchestrator.
//!
//! ```text
//! Idle --bundle--> Bundling --all jobs ok--> Redirected --cleanup--> Relocating --> Idle
//!                     |
//!                     +--any job failed--> Idle (service path untouched)
//! ```
//!
//! The host owns the [`Service`]; each phase borrows it mutably for the
//! duration of one hook call, which is the only time the service path may be
//! rewritten.

use std::path::PathBuf;

use slsparcel_bundler::{run_jobs, Bundler};
use slsparcel_core::config::BuildConfig;
use slsparcel_core::{JobFailure, PackError, Service};

use crate::hooks::{LifecycleHook, Phase};
use crate::layout::BuildLayout;
use crate::relocate::relocate_artifacts;
use crate::resolver::{resolve_jobs, selected_functions, Selection};

/// Options the host passes on the command line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PluginOptions {
    /// `--function` for single-function deploys.
    pub function: Option<String>,
}

#[derive(Debug)]
enum CycleState {
    Idle,
    Redirected {
        original: PathBuf,
        selection: Selection,
    },
}

pub struct ParcelPlugin<B> {
    bundler: B,
    config: BuildConfig,
    options: PluginOptions,
    layout: BuildLayout,
    state: CycleState,
}

impl<B: Bundler> ParcelPlugin<B> {
    /// Capture the service root the host reports now; every later path is
    /// derived from it, whatever the service path points at mid-cycle.
    pub fn new(
        service: &Service,
        bundler: B,
        config: BuildConfig,
        options: PluginOptions,
    ) -> Result<Self, PackError> {
        let layout = BuildLayout::new(service.service_path.get(), &config)?;
        Ok(Self {
            bundler,
            config,
            options,
            layout,
            state: CycleState::Idle,
        })
    }

    /// Hooks to register with the host.
    pub fn hooks(&self) -> &'static [LifecycleHook] {
        &LifecycleHook::ALL
    }

    pub fn layout(&self) -> &BuildLayout {
        &self.layout
    }

    /// `true` between a successful bundle and the matching cleanup.
    pub fn is_redirected(&self) -> bool {
        matches!(self.state, CycleState::Redirected { .. })
    }

    /// Entry point for the host's hook dispatch.
    pub fn run_hook(&mut self, hook: LifecycleHook, service: &mut Service) -> Result<(), PackError> {
        tracing::debug!("hook {}", hook);
        match hook.phase() {
            Phase::Bundle => {
                let selection = self.selection_for(hook)?;
                self.bundle(service, selection)
            }
            Phase::Cleanup => self.cleanup(service),
        }
    }

    /// Build jobs for `selection` without running them.
    pub fn resolve(
        &self,
        service: &Service,
        selection: &Selection,
    ) -> Result<Vec<slsparcel_bundler::BuildJob>, PackError> {
        resolve_jobs(service, &self.layout, selection)
    }

    /// Resolve and run every job, then redirect the service path to the
    /// build root. On any failure the service path is left as it was.
    pub fn bundle(&mut self, service: &mut Service, selection: Selection) -> Result<(), PackError> {
        if self.is_redirected() {
            return Err(PackError::Cycle(
                "bundle hook fired again before the previous cycle was cleaned up".to_string(),
            ));
        }
        if service.service_path.get() != self.layout.service_root {
            return Err(PackError::Cycle(format!(
                "service path is {} but the plugin was created for {}",
                service.service_path,
                self.layout.service_root.display()
            )));
        }

        tracing::info!("bundling parcel entries...");
        let jobs = self.resolve(service, &selection)?;

        // Leftovers from an interrupted cycle would end up in the package.
        if slsparcel_fs::remove_all(&self.layout.build_root).map_err(PackError::Cleanup)? {
            tracing::debug!(
                "removed stale build folder {}",
                self.layout.build_root_rel().display()
            );
        }

        let outcomes = run_jobs(&self.bundler, &jobs, &self.layout.service_root, self.config.jobs);
        tracing::debug!(
            "{} of {} jobs succeeded",
            outcomes.iter().filter(|o| o.is_ok()).count(),
            outcomes.len()
        );
        let failures: Vec<JobFailure> = outcomes
            .iter()
            .filter_map(|o| {
                o.result.as_ref().err().map(|e| JobFailure {
                    job: o.job.origin.to_string(),
                    message: e.to_string(),
                })
            })
            .collect();

        if !failures.is_empty() {
            self.discard_build_root();
            return Err(PackError::Bundle {
                total: jobs.len(),
                failures,
            });
        }

        let original = service
            .service_path
            .redirect(self.layout.build_root.clone());
        tracing::info!(
            "bundled {} entries with {}, service path now {}",
            jobs.len(),
            self.bundler.name(),
            service.service_path
        );
        self.state = CycleState::Redirected {
            original,
            selection,
        };
        Ok(())
    }

    /// Relocate artifacts, restore the service path and remove the build
    /// root. The restore and removal run even when relocation fails; the
    /// relocation error is returned afterwards.
    pub fn cleanup(&mut self, service: &mut Service) -> Result<(), PackError> {
        let CycleState::Redirected {
            original,
            selection,
        } = std::mem::replace(&mut self.state, CycleState::Idle)
        else {
            tracing::warn!("cleanup hook fired without a bundled cycle, nothing to do");
            return Ok(());
        };

        tracing::info!("cleaning up parcel bundles");
        let relocated = selected_functions(service, &selection)
            .and_then(|names| relocate_artifacts(service, &names, &self.layout.deploy_dir));

        service.service_path.restore(original);
        let removed = slsparcel_fs::remove_all(&self.layout.build_root);

        let count = relocated?;
        removed.map_err(PackError::Cleanup)?;
        tracing::info!(
            "moved {} artifacts to {}",
            count,
            self.layout.deploy_dir.display()
        );
        Ok(())
    }

    /// Undo a cycle the host could not finish: restore the service path and
    /// remove the build root without relocating anything.
    pub fn abort(&mut self, service: &mut Service) -> Result<(), PackError> {
        if let CycleState::Redirected { original, .. } =
            std::mem::replace(&mut self.state, CycleState::Idle)
        {
            tracing::warn!("aborting packaging cycle, restoring service path");
            service.service_path.restore(original);
        }
        slsparcel_fs::remove_all(&self.layout.build_root)
            .map(|_| ())
            .map_err(PackError::Cleanup)
    }

    fn selection_for(&self, hook: LifecycleHook) -> Result<Selection, PackError> {
        if !hook.is_single_function() {
            return Ok(Selection::All);
        }
        self.options
            .function
            .clone()
            .map(Selection::Function)
            .ok_or_else(|| {
                PackError::config(format!("{} requires a function name", hook.event_name()))
            })
    }

    fn discard_build_root(&self) {
        if self.config.keep_build_on_failure {
            tracing::warn!(
                "keeping partial build output in {}",
                self.layout.build_root.display()
            );
            return;
        }
        if let Err(e) = slsparcel_fs::remove_all(&self.layout.build_root) {
            tracing::warn!("could not remove partial build output: {}", e);
        }
    }
}
