//! Linux task table read from `/proc`
//!
//! Every kernel thread is a task. Its run time is `utime + stime` from
//! `/proc/<pid>/task/<tid>/stat`, in clock ticks; the scheduler-wide clock is
//! `/proc/uptime` converted to the same unit. The thread start time is used as
//! the identity generation, so a recycled TID is never mistaken for the
//! thread that held it before.
//!
//! Procfs offers no atomic enumeration. Threads that exit between listing and
//! reading are skipped, which the differ then reports as deleted.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use nix::errno::Errno;
use nix::unistd::{sysconf, SysconfVar};

use crate::error::{EstimatorError, Result};
use crate::provider::{SystemState, TaskTableProvider};
use crate::task::{TaskIdentity, TaskRecord};

/// Fallback when `sysconf(_SC_CLK_TCK)` is unavailable
const DEFAULT_CLOCK_TICKS: u64 = 100;

/// Which threads make up the task table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// Every thread of every process
    System,
    /// Threads of one process
    Process(i32),
}

/// Fields of a `/proc/.../stat` line the estimator needs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatFields {
    pub tid: u64,
    pub comm: String,
    pub utime: u64,
    pub stime: u64,
    pub starttime: u64,
}

impl StatFields {
    pub fn run_time(&self) -> u64 {
        self.utime.saturating_add(self.stime)
    }
}

/// Parse a stat line
///
/// `comm` may itself contain spaces and parentheses, so it spans from the
/// first `(` to the last `)`.
pub fn parse_stat(line: &str) -> Option<StatFields> {
    let open = line.find('(')?;
    let close = line.rfind(')')?;
    if close < open {
        return None;
    }

    let tid = line[..open].trim().parse().ok()?;
    let comm = line[open + 1..close].to_string();

    // Index 0 is field 3 (state)
    let rest: Vec<&str> = line[close + 1..].split_whitespace().collect();
    let field = |n: usize| -> Option<u64> { rest.get(n - 3)?.parse().ok() };

    Some(StatFields {
        tid,
        comm,
        utime: field(14)?,
        stime: field(15)?,
        starttime: field(22)?,
    })
}

/// Parse `/proc/uptime` into hundredths of a second
pub fn parse_uptime(content: &str) -> Option<u64> {
    let first = content.split_whitespace().next()?;
    let (secs, frac) = first.split_once('.').unwrap_or((first, "0"));
    let secs: u64 = secs.parse().ok()?;

    let mut digits = frac.chars().chain(std::iter::repeat('0')).take(2);
    let tens = digits.next()?.to_digit(10)?;
    let ones = digits.next()?.to_digit(10)?;

    secs.checked_mul(100)?
        .checked_add(u64::from(tens * 10 + ones))
}

/// Task table backed by a procfs mount
#[derive(Debug, Clone)]
pub struct ProcTaskTable {
    root: PathBuf,
    scope: Scope,
    clock_ticks: u64,
}

impl ProcTaskTable {
    /// All threads on the host
    pub fn system() -> Self {
        Self::with_root("/proc", Scope::System, host_clock_ticks())
    }

    /// Threads of process `pid`
    pub fn process(pid: i32) -> Self {
        Self::with_root("/proc", Scope::Process(pid), host_clock_ticks())
    }

    /// Table rooted at an arbitrary procfs-shaped directory
    pub fn with_root(root: impl Into<PathBuf>, scope: Scope, clock_ticks: u64) -> Self {
        Self {
            root: root.into(),
            scope,
            clock_ticks: clock_ticks.max(1),
        }
    }

    pub fn scope(&self) -> Scope {
        self.scope
    }

    /// Clock ticks per second used for all counters
    pub fn clock_ticks(&self) -> u64 {
        self.clock_ticks
    }

    fn uptime_ticks(&self) -> Result<u64> {
        let content = fs::read_to_string(self.root.join("uptime"))?;
        let centis = parse_uptime(&content).ok_or_else(|| {
            EstimatorError::Provider(format!("unparsable uptime: {:?}", content.trim()))
        })?;
        let ticks = u128::from(centis) * u128::from(self.clock_ticks) / 100;
        Ok(u64::try_from(ticks).unwrap_or(u64::MAX))
    }

    /// Stat file paths of every thread in scope
    fn stat_paths(&self) -> Result<Vec<PathBuf>> {
        match self.scope {
            Scope::Process(pid) => {
                let task_dir = self.root.join(pid.to_string()).join("task");
                thread_stat_paths(&task_dir).map_err(|err| {
                    if is_gone(&err) {
                        EstimatorError::Provider(format!("process {} not found", pid))
                    } else {
                        EstimatorError::Provider(format!(
                            "failed to read {}: {}",
                            task_dir.display(),
                            err
                        ))
                    }
                })
            }
            Scope::System => {
                let mut paths = Vec::new();
                for pid_dir in numeric_entries(&self.root)? {
                    match thread_stat_paths(&pid_dir.join("task")) {
                        Ok(mut threads) => paths.append(&mut threads),
                        Err(err) if is_gone(&err) => {}
                        Err(err) => {
                            tracing::debug!("skipping {}: {}", pid_dir.display(), err);
                        }
                    }
                }
                Ok(paths)
            }
        }
    }
}

impl TaskTableProvider for ProcTaskTable {
    fn task_count(&mut self) -> Result<usize> {
        Ok(self.stat_paths()?.len())
    }

    fn capture_into(
        &mut self,
        buffer: &mut Vec<TaskRecord>,
        capacity: usize,
    ) -> Result<SystemState> {
        let total_run_time = self.uptime_ticks()?;

        for path in self.stat_paths()? {
            let line = match fs::read_to_string(&path) {
                Ok(line) => line,
                Err(err) if is_gone(&err) => continue,
                Err(err) => {
                    tracing::debug!("skipping {}: {}", path.display(), err);
                    continue;
                }
            };

            let Some(stat) = parse_stat(&line) else {
                tracing::warn!("unparsable stat line in {}", path.display());
                continue;
            };
            if buffer.len() >= capacity {
                tracing::debug!("capture buffer full at {} tasks", capacity);
                buffer.clear();
                return Err(EstimatorError::SnapshotOverflow { capacity });
            }
            buffer.push(TaskRecord::new(
                TaskIdentity::with_generation(stat.tid, stat.starttime),
                &stat.comm,
                stat.run_time(),
            ));
        }

        Ok(SystemState {
            task_count: buffer.len(),
            total_run_time,
        })
    }
}

fn host_clock_ticks() -> u64 {
    match sysconf(SysconfVar::CLK_TCK) {
        Ok(Some(ticks)) if ticks > 0 => ticks as u64,
        _ => DEFAULT_CLOCK_TICKS,
    }
}

/// Thread or process exited while we were looking at it
fn is_gone(err: &io::Error) -> bool {
    err.kind() == io::ErrorKind::NotFound || err.raw_os_error() == Some(Errno::ESRCH as i32)
}

/// Subdirectories of `dir` whose names are all digits, in ascending order
fn numeric_entries(dir: &Path) -> io::Result<Vec<PathBuf>> {
    let mut entries: Vec<(u64, PathBuf)> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .filter_map(|entry| {
            let id = entry.file_name().to_str()?.parse::<u64>().ok()?;
            Some((id, entry.path()))
        })
        .collect();
    entries.sort_unstable_by_key(|(id, _)| *id);
    Ok(entries.into_iter().map(|(_, path)| path).collect())
}

fn thread_stat_paths(task_dir: &Path) -> io::Result<Vec<PathBuf>> {
    Ok(numeric_entries(task_dir)?
        .into_iter()
        .map(|dir| dir.join("stat"))
        .collect())
}
