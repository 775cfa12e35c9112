//! The interactive operator: prompts, disc reports and copy progress on the terminal.
use console::style;
use dialoguer::{Input, theme::ColorfulTheme};
use discarchive_core::session::resolve_volume_name;
use discarchive_core::{
    Config, CopyMethod, CopyProgress, DiscInfo, Error, Operator, Result, SessionState, archive,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use std::time::Duration;

fn prompt_error(e: dialoguer::Error) -> Error {
    Error::Prompt(e.to_string())
}

pub struct ConsoleOperator {
    config: Config,
    wait_pb: ProgressBar,
    copy_pb: ProgressBar,
}

impl ConsoleOperator {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            wait_pb: ProgressBar::hidden(),
            copy_pb: ProgressBar::hidden(),
        }
    }

    fn start_waiting(&mut self) {
        self.wait_pb = ProgressBar::new_spinner();
        self.wait_pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.blue} [{elapsed_precise}] {msg}")
                .unwrap(),
        );
        self.wait_pb.set_message(format!(
            "Waiting for a data disc in {}",
            style(self.config.device.display()).cyan()
        ));
        self.wait_pb.enable_steady_tick(Duration::from_millis(100));
    }
}

impl CopyProgress for ConsoleOperator {
    fn copy_started(&mut self, total_bytes: u64) {
        self.copy_pb = ProgressBar::new(total_bytes);
        self.copy_pb.set_prefix("Copying");
        self.copy_pb.set_style(
            ProgressStyle::default_bar()
                .template(
                    "{prefix:12} [{elapsed_precise}] [{bar:40.green/black}] {bytes}/{total_bytes} ({bytes_per_sec}, {eta})",
                )
                .unwrap()
                .progress_chars("■ "),
        );
    }

    fn copy_progress(&mut self, bytes_copied: u64) {
        self.copy_pb.set_position(bytes_copied);
    }
}

impl Operator for ConsoleOperator {
    fn state_changed(&mut self, state: SessionState) {
        match state {
            SessionState::Waiting => self.start_waiting(),
            SessionState::Labeled | SessionState::Stopped => self.wait_pb.finish_and_clear(),
            SessionState::Archiving if self.config.copy_method == CopyMethod::Cp => {
                println!(
                    "Copying {} with cp...",
                    style(self.config.mount_point.display()).cyan()
                );
            }
            SessionState::Ejecting => println!("Ejecting..."),
            _ => {}
        }
    }

    fn disc_detected(&mut self, info: &DiscInfo) {
        println!();
        if !info.drive_report.is_empty() {
            println!("{}", info.drive_report.trim_end());
        }
        println!("{}", info.iso_report.trim_end());
        println!();
    }

    fn confirm_name(&mut self, detected: &str) -> Result<String> {
        let config = &self.config;
        Input::<String>::with_theme(&ColorfulTheme::default())
            .with_prompt(format!("Enter volume name to continue [{}]", detected))
            .allow_empty(true)
            .validate_with(|answer: &String| -> std::result::Result<(), String> {
                let name = resolve_volume_name(detected, answer);
                archive::destination(config, &name)
                    .map(|_| ())
                    .map_err(|e| e.to_string())
            })
            .interact_text()
            .map_err(prompt_error)
    }

    fn archived(&mut self, path: &Path) {
        self.copy_pb.finish_with_message("Copy complete.");
        println!("\n✨ Archived disc to {}.", style(path.display()).cyan());
    }

    fn confirm_continue(&mut self) -> Result<()> {
        Input::<String>::with_theme(&ColorfulTheme::default())
            .with_prompt("Continue?")
            .allow_empty(true)
            .interact_text()
            .map_err(prompt_error)?;
        Ok(())
    }
}
