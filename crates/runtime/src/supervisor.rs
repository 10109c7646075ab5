use std::collections::HashMap;
use std::future::Future;

use serde::Serialize;
use tokio::task::JoinHandle;
use tracing::{error, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Activity {
    Feed,
    Decision,
    Reporting,
}

impl Activity {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Feed => "feed",
            Self::Decision => "decision",
            Self::Reporting => "reporting",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityLifecycle {
    Starting,
    Running,
    Stopped,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SupervisedActivity {
    pub activity: Activity,
    pub state: ActivityLifecycle,
}

/// Tracks the periodic tasks of a session and joins them on shutdown.
#[derive(Debug, Default)]
pub struct Supervisor {
    activities: HashMap<Activity, SupervisedActivity>,
    handles: Vec<(Activity, JoinHandle<()>)>,
}

impl Supervisor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, activity: Activity) {
        self.activities.insert(
            activity,
            SupervisedActivity {
                activity,
                state: ActivityLifecycle::Starting,
            },
        );
    }

    pub fn mark_running(&mut self, activity: Activity) {
        self.transition(activity, ActivityLifecycle::Running);
    }

    pub fn mark_stopped(&mut self, activity: Activity) {
        self.transition(activity, ActivityLifecycle::Stopped);
    }

    /// Returns `false` for an activity that was never registered.
    pub fn mark_failed(&mut self, activity: Activity) -> bool {
        self.transition(activity, ActivityLifecycle::Failed)
    }

    pub fn state(&self, activity: Activity) -> Option<ActivityLifecycle> {
        self.activities.get(&activity).map(|supervised| supervised.state)
    }

    /// Must be called from within a tokio runtime.
    pub fn spawn<F>(&mut self, activity: Activity, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.register(activity);
        self.handles.push((activity, tokio::spawn(task)));
        self.mark_running(activity);
        info!(activity = activity.as_str(), "activity started");
    }

    /// Waits for every spawned task and returns the final states in spawn
    /// order. A task that panicked is reported as failed.
    pub async fn join_all(&mut self) -> Vec<SupervisedActivity> {
        let handles = std::mem::take(&mut self.handles);
        let mut finished = Vec::with_capacity(handles.len());

        for (activity, handle) in handles {
            match handle.await {
                Ok(()) => {
                    self.mark_stopped(activity);
                    info!(activity = activity.as_str(), "activity stopped");
                }
                Err(err) => {
                    self.mark_failed(activity);
                    error!(activity = activity.as_str(), %err, "activity failed");
                }
            }
            if let Some(supervised) = self.activities.get(&activity) {
                finished.push(*supervised);
            }
        }

        finished
    }

    fn transition(&mut self, activity: Activity, state: ActivityLifecycle) -> bool {
        match self.activities.get_mut(&activity) {
            Some(supervised) => {
                supervised.state = state;
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Activity, ActivityLifecycle, Supervisor};

    #[test]
    fn mark_failed_returns_false_for_unknown_activity() {
        let mut supervisor = Supervisor::new();

        assert!(!supervisor.mark_failed(Activity::Reporting));
        assert_eq!(supervisor.state(Activity::Reporting), None);
    }

    #[test]
    fn registered_activity_moves_through_lifecycle() {
        let mut supervisor = Supervisor::new();
        supervisor.register(Activity::Feed);
        assert_eq!(
            supervisor.state(Activity::Feed),
            Some(ActivityLifecycle::Starting)
        );

        supervisor.mark_running(Activity::Feed);
        assert_eq!(
            supervisor.state(Activity::Feed),
            Some(ActivityLifecycle::Running)
        );

        supervisor.mark_stopped(Activity::Feed);
        assert_eq!(
            supervisor.state(Activity::Feed),
            Some(ActivityLifecycle::Stopped)
        );
    }

    #[tokio::test(flavor = "current_thread")]
    async fn join_all_reports_stopped_and_failed_tasks() {
        let mut supervisor = Supervisor::new();
        supervisor.spawn(Activity::Feed, async {});
        supervisor.spawn(Activity::Decision, async {
            panic!("decision task blew up");
        });

        let finished = supervisor.join_all().await;

        assert_eq!(finished.len(), 2);
        assert_eq!(finished[0].activity, Activity::Feed);
        assert_eq!(finished[0].state, ActivityLifecycle::Stopped);
        assert_eq!(finished[1].activity, Activity::Decision);
        assert_eq!(finished[1].state, ActivityLifecycle::Failed);
    }
}
