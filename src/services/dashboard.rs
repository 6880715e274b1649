use crate::config::Config;
use crate::energy;
use crate::error::{AppError, Result};
use crate::models::reading::sort_ascending;
use crate::models::{Command, Reading};
use crate::repositories::{CommandSink, ReadingSource};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};

pub const WAITING_MESSAGE: &str = "Waiting for data... Is the local collector script running?";

/// Knobs the service needs, lifted out of [`Config`].
#[derive(Debug, Clone)]
pub struct DashboardSettings {
    pub title: String,
    pub fetch_limit: usize,
    pub chart_points: usize,
    pub raw_log_rows: usize,
    pub refresh_secs: u64,
    pub polling: bool,
    pub controls_enabled: bool,
}

impl From<&Config> for DashboardSettings {
    fn from(cfg: &Config) -> Self {
        Self {
            title: cfg.dashboard.title.clone(),
            fetch_limit: cfg.poller.fetch_limit,
            chart_points: cfg.dashboard.chart_points,
            raw_log_rows: cfg.dashboard.raw_log_rows,
            refresh_secs: cfg.poller.interval_secs,
            polling: cfg.poller.enabled,
            controls_enabled: cfg.dashboard.controls_enabled,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardSnapshot {
    pub updated_at: DateTime<Utc>,
    pub status: SnapshotStatus,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SnapshotStatus {
    /// No poll has completed yet.
    Loading,
    Waiting {
        message: String,
    },
    Ready(DashboardView),
    Error {
        message: String,
        /// Only set when a poller will retry on its own.
        retry_in_secs: Option<u64>,
    },
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardView {
    pub metrics: Metrics,
    pub latest: Reading,
    pub reading_count: usize,
    pub chart: Vec<ChartPoint>,
    pub raw_log: Vec<Reading>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Metrics {
    pub power: String,
    pub voltage: String,
    pub current: String,
    pub total_usage: String,
    pub total_kwh: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ChartPoint {
    pub timestamp: DateTime<Utc>,
    pub power_w: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct EnergyTotal {
    pub total_kwh: f64,
    pub reading_count: usize,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

impl DashboardSnapshot {
    pub fn loading() -> Self {
        Self {
            updated_at: Utc::now(),
            status: SnapshotStatus::Loading,
        }
    }

    pub fn error(
        message: impl Into<String>,
        retry_in_secs: Option<u64>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            updated_at: now,
            status: SnapshotStatus::Error {
                message: message.into(),
                retry_in_secs,
            },
        }
    }
}

/// Turn one fetch into what the page shows.
pub fn build_snapshot(
    mut readings: Vec<Reading>,
    settings: &DashboardSettings,
    now: DateTime<Utc>,
) -> DashboardSnapshot {
    if readings.is_empty() {
        return DashboardSnapshot {
            updated_at: now,
            status: SnapshotStatus::Waiting {
                message: WAITING_MESSAGE.to_string(),
            },
        };
    }

    sort_ascending(&mut readings);

    let total_kwh = energy::total_kwh(&readings);
    let latest = readings[readings.len() - 1].clone();
    let metrics = Metrics {
        power: format!("{:.2} W", latest.power_w),
        voltage: format!("{:.1} V", latest.voltage_v),
        current: format!("{} mA", latest.current_ma),
        total_usage: format!("{:.3} kWh", total_kwh),
        total_kwh,
    };

    let chart = tail(&readings, settings.chart_points)
        .iter()
        .map(|r| ChartPoint {
            timestamp: r.timestamp,
            power_w: r.power_w,
        })
        .collect();
    let raw_log = tail(&readings, settings.raw_log_rows).to_vec();

    DashboardSnapshot {
        updated_at: now,
        status: SnapshotStatus::Ready(DashboardView {
            metrics,
            latest,
            reading_count: readings.len(),
            chart,
            raw_log,
        }),
    }
}

fn tail<T>(items: &[T], n: usize) -> &[T] {
    &items[items.len().saturating_sub(n)..]
}

#[derive(Clone)]
pub struct DashboardService {
    source: Arc<dyn ReadingSource>,
    sink: Option<Arc<dyn CommandSink>>,
    settings: DashboardSettings,
    latest: Arc<RwLock<DashboardSnapshot>>,
}

impl DashboardService {
    pub fn new(
        source: Arc<dyn ReadingSource>,
        sink: Option<Arc<dyn CommandSink>>,
        settings: DashboardSettings,
    ) -> Self {
        Self {
            source,
            sink,
            settings,
            latest: Arc::new(RwLock::new(DashboardSnapshot::loading())),
        }
    }

    pub fn settings(&self) -> &DashboardSettings {
        &self.settings
    }

    /// Fetch, rebuild and cache the snapshot. Failures end up in the snapshot.
    pub async fn refresh(&self) -> DashboardSnapshot {
        let now = Utc::now();
        let snapshot = match self.source.fetch_recent(self.settings.fetch_limit).await {
            Ok(readings) => {
                let snapshot = build_snapshot(readings, &self.settings, now);
                match &snapshot.status {
                    SnapshotStatus::Waiting { .. } => {
                        warn!("No readings yet, is the collector running?")
                    }
                    SnapshotStatus::Ready(view) => debug!(
                        readings = view.reading_count,
                        total_kwh = view.metrics.total_kwh,
                        "Dashboard refreshed"
                    ),
                    _ => {}
                }
                snapshot
            }
            Err(e) => {
                error!(error = %e, "Failed to fetch readings");
                let retry_in_secs = self.settings.polling.then_some(self.settings.refresh_secs);
                DashboardSnapshot::error(e.to_string(), retry_in_secs, now)
            }
        };

        *self.latest.write().await = snapshot.clone();
        snapshot
    }

    /// Cached snapshot while polling, a fresh one-shot fetch otherwise.
    pub async fn current(&self) -> DashboardSnapshot {
        if self.settings.polling {
            self.latest.read().await.clone()
        } else {
            self.refresh().await
        }
    }

    /// Recent readings oldest first.
    pub async fn recent_readings(&self, limit: usize) -> Result<Vec<Reading>> {
        if limit == 0 || limit > self.settings.fetch_limit {
            return Err(AppError::InvalidInput(format!(
                "limit must be between 1 and {}",
                self.settings.fetch_limit
            )));
        }
        let mut readings = self.source.fetch_recent(limit).await?;
        sort_ascending(&mut readings);
        Ok(readings)
    }

    pub async fn energy_total(&self) -> Result<EnergyTotal> {
        let readings = self.recent_readings(self.settings.fetch_limit).await?;
        Ok(EnergyTotal {
            total_kwh: energy::total_kwh(&readings),
            reading_count: readings.len(),
            from: readings.first().map(|r| r.timestamp),
            to: readings.last().map(|r| r.timestamp),
        })
    }

    /// Refuse early when there is nowhere to send commands.
    pub fn ensure_controls(&self) -> Result<&Arc<dyn CommandSink>> {
        if !self.settings.controls_enabled {
            return Err(AppError::ControlsDisabled);
        }
        self.sink.as_ref().ok_or(AppError::ControlsDisabled)
    }

    pub async fn send_command(&self, command: Command) -> Result<()> {
        let sink = self.ensure_controls()?;
        sink.insert_command(command).await?;
        info!(%command, "Command sent");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::{Duration, TimeZone};
    use pretty_assertions::assert_eq;
    use std::sync::Mutex;

    fn settings() -> DashboardSettings {
        DashboardSettings {
            title: "Test".into(),
            fetch_limit: 1000,
            chart_points: 3,
            raw_log_rows: 2,
            refresh_secs: 15,
            polling: true,
            controls_enabled: false,
        }
    }

    fn reading(secs: i64, power_w: f64) -> Reading {
        Reading {
            timestamp: Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
                + Duration::seconds(secs),
            power_w,
            voltage_v: 229.84,
            current_ma: 412.0,
        }
    }

    struct StaticSource {
        readings: Vec<Reading>,
        fail: bool,
        calls: Mutex<Vec<usize>>,
    }

    #[async_trait]
    impl ReadingSource for StaticSource {
        async fn fetch_recent(&self, limit: usize) -> Result<Vec<Reading>> {
            self.calls.lock().unwrap().push(limit);
            if self.fail {
                return Err(AppError::Upstream {
                    status: 503,
                    message: "service unavailable".into(),
                });
            }
            let mut newest_first = self.readings.clone();
            newest_first.sort_by_key(|r| std::cmp::Reverse(r.timestamp));
            newest_first.truncate(limit);
            Ok(newest_first)
        }
    }

    #[derive(Default)]
    struct RecordingSink {
        sent: Mutex<Vec<Command>>,
    }

    #[async_trait]
    impl CommandSink for RecordingSink {
        async fn insert_command(&self, command: Command) -> Result<()> {
            self.sent.lock().unwrap().push(command);
            Ok(())
        }
    }

    fn source(readings: Vec<Reading>) -> Arc<StaticSource> {
        Arc::new(StaticSource {
            readings,
            fail: false,
            calls: Mutex::new(Vec::new()),
        })
    }

    #[test]
    fn test_empty_fetch_is_waiting() {
        let snapshot = build_snapshot(vec![], &settings(), Utc::now());
        match snapshot.status {
            SnapshotStatus::Waiting { message } => assert_eq!(message, WAITING_MESSAGE),
            other => panic!("expected waiting, got {:?}", other),
        }
    }

    #[test]
    fn test_metrics_come_from_latest_reading() {
        let readings = vec![reading(30, 101.239), reading(0, 100.0), reading(15, 100.0)];
        let snapshot = build_snapshot(readings, &settings(), Utc::now());

        let SnapshotStatus::Ready(view) = snapshot.status else {
            panic!("expected ready snapshot");
        };
        assert_eq!(view.latest.power_w, 101.239);
        assert_eq!(view.metrics.power, "101.24 W");
        assert_eq!(view.metrics.voltage, "229.8 V");
        assert_eq!(view.metrics.current, "412 mA");
        assert_eq!(view.metrics.total_usage, "0.001 kWh");
        assert_eq!(view.reading_count, 3);
    }

    #[test]
    fn test_chart_and_log_are_tail_windows() {
        let readings: Vec<Reading> = (0..10).rev().map(|i| reading(i * 15, i as f64)).collect();
        let snapshot = build_snapshot(readings, &settings(), Utc::now());

        let SnapshotStatus::Ready(view) = snapshot.status else {
            panic!("expected ready snapshot");
        };
        let chart_power: Vec<f64> = view.chart.iter().map(|p| p.power_w).collect();
        assert_eq!(chart_power, vec![7.0, 8.0, 9.0]);
        let log_power: Vec<f64> = view.raw_log.iter().map(|r| r.power_w).collect();
        assert_eq!(log_power, vec![8.0, 9.0]);
    }

    #[test]
    fn test_tail_shorter_than_window() {
        assert_eq!(tail(&[1, 2], 5), &[1, 2]);
        assert_eq!(tail(&[1, 2, 3], 0), &[] as &[i32]);
    }

    #[tokio::test]
    async fn test_refresh_caches_snapshot_when_polling() {
        let src = source(vec![reading(0, 50.0), reading(15, 60.0)]);
        let service = DashboardService::new(src.clone(), None, settings());

        assert!(matches!(service.current().await.status, SnapshotStatus::Loading));

        service.refresh().await;
        assert!(matches!(service.current().await.status, SnapshotStatus::Ready(_)));
        // current() must not hit the source while polling
        assert_eq!(src.calls.lock().unwrap().as_slice(), &[1000]);
    }

    #[tokio::test]
    async fn test_current_fetches_on_demand_without_poller() {
        let src = source(vec![reading(0, 50.0)]);
        let service = DashboardService::new(
            src.clone(),
            None,
            DashboardSettings {
                polling: false,
                ..settings()
            },
        );

        assert!(matches!(service.current().await.status, SnapshotStatus::Ready(_)));
        assert!(matches!(service.current().await.status, SnapshotStatus::Ready(_)));
        assert_eq!(src.calls.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_refresh_failure_becomes_error_snapshot() {
        let src = Arc::new(StaticSource {
            readings: vec![],
            fail: true,
            calls: Mutex::new(Vec::new()),
        });
        let service = DashboardService::new(src, None, settings());

        let snapshot = service.refresh().await;
        match snapshot.status {
            SnapshotStatus::Error {
                message,
                retry_in_secs,
            } => {
                assert!(message.contains("503"));
                assert_eq!(retry_in_secs, Some(15));
            }
            other => panic!("expected error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_one_shot_failure_has_no_retry_delay() {
        let src = Arc::new(StaticSource {
            readings: vec![],
            fail: true,
            calls: Mutex::new(Vec::new()),
        });
        let one_shot = DashboardSettings {
            polling: false,
            ..settings()
        };
        let service = DashboardService::new(src, None, one_shot);

        match service.current().await.status {
            SnapshotStatus::Error { retry_in_secs, .. } => assert_eq!(retry_in_secs, None),
            other => panic!("expected error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_recent_readings_sorted_and_limited() {
        let src = source(vec![reading(30, 3.0), reading(0, 1.0), reading(15, 2.0)]);
        let service = DashboardService::new(src, None, settings());

        let readings = service.recent_readings(2).await.unwrap();
        let power: Vec<f64> = readings.iter().map(|r| r.power_w).collect();
        assert_eq!(power, vec![2.0, 3.0]);
    }

    #[tokio::test]
    async fn test_recent_readings_rejects_bad_limit() {
        let service = DashboardService::new(source(vec![]), None, settings());
        assert!(matches!(
            service.recent_readings(0).await,
            Err(AppError::InvalidInput(_))
        ));
        assert!(matches!(
            service.recent_readings(1001).await,
            Err(AppError::InvalidInput(_))
        ));
    }

    #[tokio::test]
    async fn test_energy_total_over_window() {
        let src = source(vec![reading(0, 100.0), reading(3600, 100.0)]);
        let service = DashboardService::new(src, None, settings());

        let total = service.energy_total().await.unwrap();
        assert!((total.total_kwh - 0.1).abs() < 1e-12);
        assert_eq!(total.reading_count, 2);
        assert_eq!(total.from, Some(reading(0, 0.0).timestamp));
        assert_eq!(total.to, Some(reading(3600, 0.0).timestamp));
    }

    #[tokio::test]
    async fn test_send_command_requires_controls() {
        let sink = Arc::new(RecordingSink::default());
        let service = DashboardService::new(source(vec![]), Some(sink.clone()), settings());

        assert!(matches!(
            service.send_command(Command::On).await,
            Err(AppError::ControlsDisabled)
        ));
        assert!(sink.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_send_command_with_controls() {
        let sink = Arc::new(RecordingSink::default());
        let service = DashboardService::new(
            source(vec![]),
            Some(sink.clone()),
            DashboardSettings {
                controls_enabled: true,
                ..settings()
            },
        );

        service.send_command(Command::Off).await.unwrap();
        service.send_command(Command::On).await.unwrap();
        assert_eq!(sink.sent.lock().unwrap().as_slice(), &[Command::Off, Command::On]);
    }
}
