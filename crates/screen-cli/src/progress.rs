//! Terminal progress display for bulk collection.

use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use screen_resolve::CollectEvent;

/// One bar per project plus a status line for skipped and failed files.
pub struct CollectProgress {
    multi: MultiProgress,
    project_bar: ProgressBar,
    status: ProgressBar,
    screens: usize,
}

impl Default for CollectProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl CollectProgress {
    pub fn new() -> Self {
        let multi = MultiProgress::new();

        let project_bar = multi.add(ProgressBar::new(0));
        project_bar.set_style(
            ProgressStyle::default_bar()
                .template("  {prefix:.bold} [{bar:30.cyan/blue}] {pos}/{len} files {msg}")
                .expect("valid template")
                .progress_chars("##-"),
        );

        let status = multi.add(ProgressBar::new_spinner());
        status.set_style(
            ProgressStyle::default_spinner()
                .template("  {spinner:.green} {msg}")
                .expect("valid template"),
        );

        Self {
            multi,
            project_bar,
            status,
            screens: 0,
        }
    }

    pub fn handle(&mut self, event: CollectEvent) {
        match event {
            CollectEvent::ProjectStarted { project, files } => {
                self.project_bar.set_prefix(project);
                self.project_bar.set_length(files as u64);
                self.project_bar.set_position(0);
                self.project_bar.set_message("");
            }
            CollectEvent::VersionScanned {
                version, screens, ..
            } => {
                self.screens += screens;
                self.project_bar.inc(1);
                self.project_bar
                    .set_message(format!("{version}: {screens} screens"));
                self.status
                    .set_message(format!("{} screens collected", self.screens));
            }
            CollectEvent::FileSkipped { file_name } => {
                self.project_bar.inc(1);
                self.status
                    .set_message(format!("skipped {file_name} (no version in name)"));
            }
            CollectEvent::FileFailed { file_name, error } => {
                self.project_bar.inc(1);
                self.multi
                    .suspend(|| eprintln!("  failed to fetch {file_name}: {error}"));
            }
            CollectEvent::ProjectFailed { project, error } => {
                self.multi
                    .suspend(|| eprintln!("  {project}: {error}"));
            }
        }
    }

    pub fn finish(&self) {
        self.project_bar.finish_and_clear();
        self.status.finish_and_clear();
    }
}
