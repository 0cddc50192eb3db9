//! CLI command action handlers

use super::{App, TerminalPrompt};
use crate::catalog::{Project, ReleaseFile};
use crate::download::{self, DownloadSink, HttpTransfer, InstallSink, ProgressCallback, SaveAsSink};
use crate::releases::{ProjectHeader, ReleaseListResult, ReleaseRow};

use anyhow::{bail, Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Arc;

impl App {
    // ========== Project Commands ==========

    pub async fn cmd_project_info(&self, project_id: u64, open_site: bool) -> Result<()> {
        let catalog = self.catalog()?;
        let project = catalog
            .get_project(project_id)
            .await
            .with_context(|| format!("Failed to fetch project {}", project_id))?;

        let header = ProjectHeader::from(&project);
        print_header(&header);

        if open_site {
            match header.website_url.as_deref() {
                Some(url) => {
                    if let Err(e) = open::that(url) {
                        tracing::warn!("Failed to open {}: {}", url, e);
                        println!("Could not open a browser. Visit: {}", url);
                    }
                }
                None => println!("This project has no website link."),
            }
        }
        Ok(())
    }

    // ========== Release Commands ==========

    pub async fn cmd_releases_list(
        &self,
        project_id: u64,
        game_version: Option<&str>,
        game_dir: Option<&str>,
        version: Option<&str>,
        limit: Option<usize>,
    ) -> Result<()> {
        let project = self.fetch_project(project_id).await;
        print_header(&ProjectHeader::from(&project));

        let result = self.load_releases(&project, game_version, game_dir, version).await?;

        let target = result.target_version.as_deref().unwrap_or("any version");
        if result.files.is_empty() {
            println!("No files available for {}.", target);
            return Ok(());
        }

        println!("Files for {} ({}):", target, result.files.len());
        println!("{:-<60}", "");
        let shown = limit.unwrap_or(result.files.len());
        for file in result.files.iter().take(shown) {
            let row = ReleaseRow::from(file);
            println!("  [{}] {}", row.file_id, row.title);
            println!("      {}", row.subtitle);
            println!("      {}", row.tags.join(", "));
        }
        if shown < result.files.len() {
            println!("  ... {} more (use --limit to show more)", result.files.len() - shown);
        }
        Ok(())
    }

    // ========== Download Commands ==========

    #[allow(clippy::too_many_arguments)]
    pub async fn cmd_download(
        &self,
        project_id: u64,
        file_id: Option<u64>,
        output: Option<&str>,
        install: bool,
        game_dir: Option<&str>,
        version: Option<&str>,
        yes: bool,
    ) -> Result<()> {
        let project = self.fetch_project(project_id).await;
        let context = self.target_context(game_dir, version)?;

        let file = match file_id {
            Some(file_id) => {
                let files = self
                    .catalog()?
                    .get_files(project_id)
                    .await
                    .with_context(|| format!("Failed to list files of project {}", project_id))?;
                files
                    .into_iter()
                    .find(|f| f.id == file_id)
                    .with_context(|| {
                        format!("File {} not found in project {}", file_id, project_id)
                    })?
            }
            None => {
                let result = self.load_releases(&project, None, game_dir, version).await?;
                match result.files.into_iter().next() {
                    Some(file) => file,
                    None => bail!("No compatible file found for {}", project.name),
                }
            }
        };

        let sink: Box<dyn DownloadSink> = if install {
            let Some(context) = context else {
                bail!(
                    "--install needs a game directory \
                     (--game-dir or `modshelf config set-game-dir`)"
                );
            };
            Box::new(InstallSink::new(context.mods_dir()))
        } else {
            let prompt = TerminalPrompt::new(self.config.downloads_dir(), yes);
            let sink = SaveAsSink::new(prompt);
            match output {
                Some(path) => Box::new(sink.with_destination(path)),
                None => Box::new(sink),
            }
        };

        let transfer = HttpTransfer::new(Some(self.config.request_timeout()))?;
        let (bar, progress) = progress_bar(&file)?;

        let outcome = download::deliver(sink.as_ref(), &transfer, &file, Some(progress)).await;
        bar.finish_and_clear();

        match outcome? {
            Some(request) => println!(
                "Downloaded {} to {}",
                file.display_name,
                request.destination.display()
            ),
            None => println!("Download cancelled."),
        }
        Ok(())
    }

    // ========== Config Commands ==========

    pub async fn cmd_config_show(&self) -> Result<()> {
        let from_env = std::env::var(crate::config::API_KEY_ENV).is_ok();
        let key_state = match (from_env, &self.config.curseforge_api_key) {
            (true, _) => "set (environment)",
            (false, Some(_)) => "set (config file)",
            (false, None) => "not set",
        };

        println!("modshelf {} configuration", crate::APP_VERSION);
        println!("{:-<40}", "");
        println!("Config file:   {}", self.config.paths.config_file().display());
        println!("API key:       {}", key_state);
        println!("API base:      {}", self.config.api_base);
        println!("Page size:     {}", self.config.page_size);
        println!("Timeout:       {}s", self.config.request_timeout_secs);
        println!(
            "Game dir:      {}",
            self.config.default_game_dir.as_deref().unwrap_or("(not set)")
        );
        println!("Downloads dir: {}", self.config.downloads_dir().display());
        Ok(())
    }

    pub async fn cmd_config_set_api_key(&mut self, key: &str) -> Result<()> {
        let key = key.trim();
        if key.is_empty() {
            bail!("API key cannot be empty");
        }
        self.config.curseforge_api_key = Some(key.to_string());
        self.config.save().await?;
        println!("API key saved.");
        Ok(())
    }

    pub async fn cmd_config_set_game_dir(&mut self, path: &str) -> Result<()> {
        let path = path.trim();
        self.config.default_game_dir = if path.is_empty() {
            None
        } else {
            Some(path.to_string())
        };
        self.config.save().await?;
        match &self.config.default_game_dir {
            Some(dir) => println!("Default game directory set to {}", dir),
            None => println!("Default game directory cleared."),
        }
        Ok(())
    }

    // ========== Helpers ==========

    /// Project metadata, or a bare reference if the lookup fails
    async fn fetch_project(&self, project_id: u64) -> Project {
        let Ok(catalog) = self.catalog() else {
            return Project::with_id(project_id);
        };
        match catalog.get_project(project_id).await {
            Ok(project) => project,
            Err(e) => {
                tracing::warn!("Failed to fetch project {}: {}", project_id, e);
                Project::with_id(project_id)
            }
        }
    }

    /// Run a release list request and wait for it to settle
    async fn load_releases(
        &self,
        project: &Project,
        game_version: Option<&str>,
        game_dir: Option<&str>,
        version: Option<&str>,
    ) -> Result<ReleaseListResult> {
        let service = self.release_service()?;
        let context = self.target_context(game_dir, version)?;

        println!("Loading files...");
        let result = match (game_version, context) {
            (Some(game_version), _) => service.list_releases(project, Some(game_version)).await,
            (None, Some(context)) => service
                .refresh(project.clone(), context)
                .await
                .context("Release list task failed")?,
            (None, None) => service.list_releases(project, None).await,
        };

        if result.is_failed() {
            if let Some(hint) = result.status.failure_hint() {
                println!("{}", hint);
            }
            bail!(
                "Failed to load files: {}",
                result.error.as_deref().unwrap_or("unknown error")
            );
        }
        Ok(result)
    }
}

fn print_header(header: &ProjectHeader) {
    println!("{}", header.title);
    if !header.subtitle.is_empty() {
        println!("  {}", header.subtitle);
    }
    if !header.tags.is_empty() {
        println!("  Categories: {}", header.tags.join(", "));
    }
    if let Some(url) = &header.website_url {
        println!("  {}", url);
    }
    println!();
}

fn progress_bar(file: &ReleaseFile) -> Result<(ProgressBar, ProgressCallback)> {
    let bar = ProgressBar::new(0);
    bar.set_style(
        ProgressStyle::default_bar()
            .template("  {spinner:.blue} {wide_msg} [{bar:30.white/dim}] {bytes}/{total_bytes} {bytes_per_sec}")
            .context("Invalid progress template")?
            .progress_chars("=>-"),
    );
    bar.set_message(file.file_name.clone());

    let handle = bar.clone();
    let progress: ProgressCallback = Arc::new(move |done: u64, total: u64| {
        if total > 0 {
            handle.set_length(total);
        }
        handle.set_position(done);
    });
    Ok((bar, progress))
}
