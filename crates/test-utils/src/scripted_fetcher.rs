use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

use changewatch::fetch::{Content, FetchError, FetchFuture, Fetcher, ScriptSet};
use changewatch::source::{SourceDescriptor, SourceId};

/// One canned response.
#[derive(Debug, Clone)]
pub enum Step {
    Respond(Content),
    Fail,
    /// Never completes (until the caller gives up on it).
    Hang,
    /// Respond after a delay.
    Slow(Duration, Content),
}

#[derive(Debug, Default)]
struct Script {
    steps: VecDeque<Step>,
    last: Option<Content>,
    calls: usize,
}

/// A fake fetcher that:
/// - replays a queue of canned steps per source
/// - once a queue runs dry, keeps returning the last content it served
/// - fails with `NotFound` for sources it knows nothing about
#[derive(Debug, Default)]
pub struct ScriptedFetcher {
    scripts: Mutex<HashMap<SourceId, Script>>,
}

impl ScriptedFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, source: &str, step: Step) -> &Self {
        let mut scripts = self.scripts.lock().unwrap();
        scripts
            .entry(SourceId::new(source))
            .or_default()
            .steps
            .push_back(step);
        self
    }

    pub fn push_lines(&self, source: &str, lines: &[&str]) -> &Self {
        self.push(source, Step::Respond(lines_content(lines)))
    }

    pub fn push_scripts(&self, source: &str, refs: &[&str]) -> &Self {
        self.push(
            source,
            Step::Respond(Content::Scripts(ScriptSet::from_references(
                refs.iter().copied(),
            ))),
        )
    }

    pub fn push_failure(&self, source: &str) -> &Self {
        self.push(source, Step::Fail)
    }

    pub fn push_hang(&self, source: &str) -> &Self {
        self.push(source, Step::Hang)
    }

    /// How many times `source` has been fetched.
    pub fn calls(&self, source: &str) -> usize {
        let scripts = self.scripts.lock().unwrap();
        scripts
            .get(&SourceId::new(source))
            .map(|s| s.calls)
            .unwrap_or(0)
    }

    fn next_step(&self, source: &SourceId) -> Option<Step> {
        let mut scripts = self.scripts.lock().unwrap();
        let script = scripts.get_mut(source)?;
        script.calls += 1;

        match script.steps.pop_front() {
            Some(step) => {
                match &step {
                    Step::Respond(content) | Step::Slow(_, content) => {
                        script.last = Some(content.clone());
                    }
                    Step::Hang => {
                        // A hanging source stays hung.
                        script.steps.push_front(Step::Hang);
                    }
                    Step::Fail => {}
                }
                Some(step)
            }
            None => script.last.clone().map(Step::Respond),
        }
    }
}

pub fn lines_content(lines: &[&str]) -> Content {
    Content::Lines(lines.iter().map(|s| s.to_string()).collect())
}

impl Fetcher for ScriptedFetcher {
    fn fetch<'a>(&'a self, source: &'a SourceDescriptor) -> FetchFuture<'a> {
        let step = self.next_step(source.id());
        Box::pin(async move {
            match step {
                Some(Step::Respond(content)) => Ok(content),
                Some(Step::Slow(delay, content)) => {
                    tokio::time::sleep(delay).await;
                    Ok(content)
                }
                Some(Step::Hang) => std::future::pending().await,
                Some(Step::Fail) | None => {
                    Err(FetchError::NotFound(source.location().to_string()))
                }
            }
        })
    }
}
