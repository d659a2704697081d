use crate::config::SyncConfig;
use crate::error::AppError;
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::HashSet;

pub mod client;
pub mod remote;

use client::HotSongClient;
use remote::{shell_quote, RemoteShell, SshShell};

/// 一次同步的统计。
///
/// `already_present` 是目标端已存在而跳过的条目；复制失败单独记在 `failed`，
/// 不影响另外两个计数。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub candidates: usize,
    pub copied: usize,
    pub already_present: usize,
    pub failed: Vec<String>,
}

/// 源目录条目与热门 ID 的交集，保持远端列表顺序。
pub fn select_candidates(entries: &[String], hot_song_ids: &HashSet<String>) -> Vec<String> {
    entries
        .iter()
        .filter(|item| hot_song_ids.contains(item.as_str()))
        .cloned()
        .collect()
}

/// 在同一台远端主机上把热门歌曲目录从 `source_dir` 复制到 `target_dir`。
///
/// 目标端已存在的目录不会被覆盖，因此重复执行是安全的。
pub fn sync_hot_songs<S: RemoteShell>(
    shell: &mut S,
    source_dir: &str,
    target_dir: &str,
    hot_song_ids: &HashSet<String>,
) -> Result<SyncReport, AppError> {
    tracing::info!("Scanning NAS source directory: {}", source_dir);
    let listing = shell.exec(&format!("ls -1 {}", shell_quote(source_dir)))?;
    if !listing.stderr.trim().is_empty() {
        tracing::error!("Error listing directory: {}", listing.stderr.trim());
    }
    let entries: Vec<String> = listing.stdout.lines().map(|l| l.to_string()).collect();

    tracing::info!("Ensuring target directory exists: {}", target_dir);
    let mkdir = shell.exec(&format!("mkdir -p {}", shell_quote(target_dir)))?;
    if !mkdir.success() {
        tracing::warn!(
            "Could not create target directory {}: {}",
            target_dir,
            mkdir.stderr.trim()
        );
    }

    let to_copy = select_candidates(&entries, hot_song_ids);
    tracing::info!("Found {} matching folders to copy.", to_copy.len());

    let mut report = SyncReport {
        candidates: to_copy.len(),
        ..Default::default()
    };

    let progress = ProgressBar::new(to_copy.len() as u64);
    if let Ok(style) = ProgressStyle::with_template("Copying on NAS {bar:40} {pos}/{len} {msg}") {
        progress.set_style(style);
    }

    for item in &to_copy {
        progress.set_message(item.clone());
        let source_path = format!("{}/{}", source_dir, item);
        let target_path = format!("{}/{}", target_dir, item);

        let check = shell.exec(&format!("test -d {}", shell_quote(&target_path)))?;
        if check.success() {
            tracing::debug!("Skipping {} (already exists)", item);
            report.already_present += 1;
            progress.inc(1);
            continue;
        }

        let copy = shell.exec(&format!(
            "cp -r {} {}",
            shell_quote(&source_path),
            shell_quote(&format!("{}/", target_dir))
        ))?;
        if copy.success() {
            report.copied += 1;
        } else {
            tracing::error!("Error copying {}: {}", item, copy.stderr.trim());
            report.failed.push(item.clone());
        }
        progress.inc(1);
    }
    progress.finish_and_clear();

    Ok(report)
}

/// 完整的同步流程：拉取热门 ID，建立 SSH 会话，执行复制。
///
/// 拉取失败或结果为空时不会连接远端，返回 `Ok(None)`。
pub async fn run(config: &SyncConfig) -> Result<Option<SyncReport>, AppError> {
    let client = HotSongClient::new(config.api_url.clone());
    let hot_song_ids = match client.fetch_hot_song_ids(config.limit).await {
        Ok(ids) => ids,
        Err(e) => {
            tracing::error!("Error fetching data from API: {}", e);
            HashSet::new()
        }
    };

    if hot_song_ids.is_empty() {
        tracing::warn!("No song IDs found to copy.");
        return Ok(None);
    }

    let config = config.clone();
    // ssh2 是阻塞接口，整个远端阶段放到阻塞线程里
    let report = tokio::task::spawn_blocking(move || -> Result<SyncReport, AppError> {
        let mut shell = SshShell::connect(
            &config.ssh_host,
            config.ssh_port,
            &config.ssh_user,
            &config.ssh_pass,
        )?;
        sync_hot_songs(
            &mut shell,
            &config.source_dir,
            &config.target_dir,
            &hot_song_ids,
        )
    })
    .await
    .map_err(|e| AppError::Internal(format!("Sync task panicked: {}", e)))??;

    Ok(Some(report))
}

#[cfg(test)]
mod tests {
    use super::remote::CommandOutput;
    use super::*;
    use std::collections::BTreeSet;

    /// 内存中的远端文件系统，只认识同步会发出的四种命令。
    struct FakeNas {
        source: Vec<String>,
        target: BTreeSet<String>,
        target_exists: bool,
        broken: HashSet<String>,
        list_stderr: String,
        commands: Vec<String>,
    }

    impl FakeNas {
        fn new(source: &[&str], target: &[&str]) -> Self {
            Self {
                source: source.iter().map(|s| s.to_string()).collect(),
                target: target.iter().map(|s| s.to_string()).collect(),
                target_exists: false,
                broken: HashSet::new(),
                list_stderr: String::new(),
                commands: Vec::new(),
            }
        }

        fn copies_issued(&self) -> usize {
            self.commands.iter().filter(|c| c.starts_with("cp -r ")).count()
        }
    }

    fn unquote(arg: &str) -> &str {
        arg.trim_matches('\'')
    }

    fn last_segment(path: &str) -> String {
        unquote(path)
            .trim_end_matches('/')
            .rsplit('/')
            .next()
            .unwrap_or_default()
            .to_string()
    }

    fn status(code: i32) -> CommandOutput {
        CommandOutput {
            exit_status: code,
            ..Default::default()
        }
    }

    impl RemoteShell for FakeNas {
        fn exec(&mut self, command: &str) -> Result<CommandOutput, AppError> {
            self.commands.push(command.to_string());

            if command.starts_with("ls -1 ") {
                let mut stdout = self.source.join("\n");
                stdout.push('\n');
                return Ok(CommandOutput {
                    exit_status: 0,
                    stdout,
                    stderr: self.list_stderr.clone(),
                });
            }
            if command.starts_with("mkdir -p ") {
                self.target_exists = true;
                return Ok(status(0));
            }
            if let Some(path) = command.strip_prefix("test -d ") {
                let item = last_segment(path);
                return Ok(status(if self.target.contains(&item) { 0 } else { 1 }));
            }
            if let Some(args) = command.strip_prefix("cp -r ") {
                let (src, dest) = args.split_once(' ').unwrap();
                assert!(unquote(dest).ends_with('/'));
                let item = last_segment(src);
                if self.broken.contains(&item) || !self.target_exists {
                    return Ok(CommandOutput {
                        exit_status: 1,
                        stdout: String::new(),
                        stderr: format!("cp: cannot stat '{}': Permission denied", item),
                    });
                }
                self.target.insert(item);
                return Ok(status(0));
            }
            Err(AppError::Remote(format!("unexpected command: {}", command)))
        }
    }

    fn ids(items: &[&str]) -> HashSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_select_candidates_keeps_listing_order() {
        let entries: Vec<String> = ["c", "a", "b", "d"].iter().map(|s| s.to_string()).collect();
        let candidates = select_candidates(&entries, &ids(&["a", "c", "z"]));
        assert_eq!(candidates, vec!["c".to_string(), "a".to_string()]);
    }

    #[test]
    fn test_skips_entries_already_in_target() {
        let mut nas = FakeNas::new(&["A", "B", "C"], &["A"]);
        let report = sync_hot_songs(&mut nas, "/src", "/dst", &ids(&["A", "C"])).unwrap();

        assert_eq!(report.candidates, 2);
        assert_eq!(report.copied, 1);
        assert_eq!(report.already_present, 1);
        assert!(report.failed.is_empty());
        assert_eq!(nas.copies_issued(), 1);
        assert!(nas.commands.contains(&"cp -r '/src/C' '/dst/'".to_string()));
        assert!(nas.target.contains("C"));
        assert!(!nas.target.contains("B"));
    }

    #[test]
    fn test_second_run_copies_nothing() {
        let mut nas = FakeNas::new(&["A", "B", "C", "D"], &[]);
        let hot = ids(&["A", "C", "D"]);

        let first = sync_hot_songs(&mut nas, "/src", "/dst", &hot).unwrap();
        assert_eq!(first.copied, 3);

        nas.commands.clear();
        let second = sync_hot_songs(&mut nas, "/src", "/dst", &hot).unwrap();
        assert_eq!(second.copied, 0);
        assert_eq!(second.already_present, 3);
        assert_eq!(nas.copies_issued(), 0);
    }

    #[test]
    fn test_copy_failure_does_not_abort_or_change_counters() {
        let mut nas = FakeNas::new(&["A", "B", "C"], &[]);
        nas.broken.insert("B".to_string());

        let report = sync_hot_songs(&mut nas, "/src", "/dst", &ids(&["A", "B", "C"])).unwrap();
        assert_eq!(report.copied, 2);
        assert_eq!(report.already_present, 0);
        assert_eq!(report.failed, vec!["B".to_string()]);
    }

    #[test]
    fn test_listing_errors_are_tolerated() {
        let mut nas = FakeNas::new(&["A"], &[]);
        nas.list_stderr = "ls: cannot access 'x': No such file or directory".to_string();

        let report = sync_hot_songs(&mut nas, "/src", "/dst", &ids(&["A"])).unwrap();
        assert_eq!(report.copied, 1);
    }

    #[test]
    fn test_command_sequence() {
        let mut nas = FakeNas::new(&["A", "B"], &[]);
        sync_hot_songs(&mut nas, "/music/all", "/music/hot", &ids(&["B"])).unwrap();

        assert_eq!(
            nas.commands,
            vec![
                "ls -1 '/music/all'".to_string(),
                "mkdir -p '/music/hot'".to_string(),
                "test -d '/music/hot/B'".to_string(),
                "cp -r '/music/all/B' '/music/hot/'".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn test_run_aborts_when_service_unreachable() {
        let config = SyncConfig {
            ssh_host: "127.0.0.1".to_string(),
            ssh_port: 1,
            ssh_user: "nobody".to_string(),
            ssh_pass: "nothing".to_string(),
            source_dir: "/src".to_string(),
            target_dir: "/dst".to_string(),
            api_url: "http://127.0.0.1:1/top_songs".to_string(),
            limit: 10,
        };

        // 拉取失败时直接结束，不会尝试 SSH 连接
        let result = run(&config).await.unwrap();
        assert!(result.is_none());
    }
}
