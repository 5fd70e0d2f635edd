use std::{
    io::{self, Write},
    sync::Arc,
};

use crate::{
    diagnostics::{DiagnosticEvent, DiagnosticSink, FailureKind},
    input::collect_cities,
    logfile::WeatherLog,
    normalize::normalize,
    provider::WeatherFetcher,
    report::present,
};

pub const NO_CITIES_MESSAGE: &str = "No cities entered. Exiting.";

/// Counts for one run over a list of cities.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub requested: usize,
    pub displayed: usize,
    pub logged: usize,
}

/// Fetch, normalize, present and log, one city at a time.
pub struct Pipeline {
    fetcher: Box<dyn WeatherFetcher>,
    log: WeatherLog,
    sink: Arc<dyn DiagnosticSink>,
}

impl Pipeline {
    pub fn new(
        fetcher: Box<dyn WeatherFetcher>,
        log: WeatherLog,
        sink: Arc<dyn DiagnosticSink>,
    ) -> Self {
        Self { fetcher, log, sink }
    }

    /// Processes `cities` in order. Per-city failures are reported to the
    /// sink and never stop the run; only a failing `out` does.
    pub async fn run<W: Write>(&self, cities: &[String], out: &mut W) -> io::Result<RunSummary> {
        let mut summary = RunSummary { requested: cities.len(), ..RunSummary::default() };

        for city in cities {
            writeln!(out, "\nFetching weather for {city}...")?;

            let raw = self.fetcher.fetch(city).await;
            let record = match normalize(raw) {
                Ok(record) => record,
                Err(err) => {
                    self.sink.report(DiagnosticEvent::error(
                        FailureKind::MalformedPayload,
                        city,
                        err.to_string(),
                    ));
                    None
                }
            };

            present(record.as_ref(), out)?;
            if record.is_some() {
                summary.displayed += 1;
            }

            match self.log.append(record.as_ref()) {
                Ok(true) => summary.logged += 1,
                Ok(false) => {}
                Err(err) => {
                    self.sink.report(DiagnosticEvent::error(
                        FailureKind::LogWrite,
                        city,
                        err.to_string(),
                    ));
                }
            }
        }

        writeln!(
            out,
            "\nWeather information retrieved for {} of {} cities; {} saved to {}.",
            summary.displayed,
            summary.requested,
            summary.logged,
            self.log.path().display()
        )?;

        Ok(summary)
    }

    /// Collects cities from `lines` first, then runs them. With no cities the
    /// run ends with an informational message and nothing is fetched.
    pub async fn run_interactive<I, S, W>(
        &self,
        lines: I,
        out: &mut W,
    ) -> io::Result<Option<RunSummary>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
        W: Write,
    {
        self.run_cities(collect_cities(lines), out).await
    }

    /// Runs already collected cities; an empty list ends with the
    /// informational message and nothing is fetched.
    pub async fn run_cities<W: Write>(
        &self,
        cities: Vec<String>,
        out: &mut W,
    ) -> io::Result<Option<RunSummary>> {
        if cities.is_empty() {
            writeln!(out, "{NO_CITIES_MESSAGE}")?;
            return Ok(None);
        }

        self.run(&cities, out).await.map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        diagnostics::{RecordingSink, Severity},
        provider::RawResponse,
        report::{SEPARATOR, UNAVAILABLE_NOTICE},
    };
    use async_trait::async_trait;
    use serde_json::{Value, json};
    use std::{collections::HashMap, fs, path::Path, sync::Mutex};

    #[derive(Debug, Default)]
    struct StubFetcher {
        responses: HashMap<String, Value>,
        calls: Arc<Mutex<Vec<String>>>,
    }

    impl StubFetcher {
        fn with(mut self, city: &str, body: Value) -> Self {
            self.responses.insert(city.to_string(), body);
            self
        }
    }

    #[async_trait]
    impl WeatherFetcher for StubFetcher {
        async fn fetch(&self, city: &str) -> Option<RawResponse> {
            self.calls.lock().unwrap().push(city.to_string());
            self.responses.get(city).map(|body| serde_json::from_value(body.clone()).unwrap())
        }
    }

    fn payload(name: &str, country: &str) -> Value {
        json!({
            "cod": 200,
            "name": name,
            "dt": 0,
            "weather": [{"description": "scattered clouds"}],
            "main": {"temp": 7.5, "feels_like": 5.0, "temp_min": 6.0, "temp_max": 9.0, "humidity": 70},
            "wind": {"speed": 2.5},
            "sys": {"country": country}
        })
    }

    struct Harness {
        pipeline: Pipeline,
        calls: Arc<Mutex<Vec<String>>>,
        sink: Arc<RecordingSink>,
        _dir: tempfile::TempDir,
    }

    impl Harness {
        fn new(fetcher: StubFetcher) -> Self {
            let dir = tempfile::tempdir().unwrap();
            let calls = Arc::clone(&fetcher.calls);
            let sink = Arc::new(RecordingSink::new());
            let pipeline = Pipeline::new(
                Box::new(fetcher),
                WeatherLog::new(dir.path().join("weather_log.txt")),
                sink.clone(),
            );
            Self { pipeline, calls, sink, _dir: dir }
        }

        fn log_path(&self) -> &Path {
            self.pipeline.log.path()
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    async fn run(h: &Harness, cities: &[&str]) -> (RunSummary, String) {
        let cities: Vec<String> = cities.iter().map(|c| c.to_string()).collect();
        let mut out = Vec::new();
        let summary = h.pipeline.run(&cities, &mut out).await.unwrap();
        (summary, String::from_utf8(out).unwrap())
    }

    #[tokio::test]
    async fn successful_city_is_displayed_and_logged() {
        let h = Harness::new(StubFetcher::default().with("paris", payload("Paris", "FR")));

        let (summary, out) = run(&h, &["paris"]).await;

        assert_eq!(summary, RunSummary { requested: 1, displayed: 1, logged: 1 });
        assert!(out.contains("Fetching weather for paris..."));
        assert!(out.contains("Weather in Paris, FR at 1970-01-01 00:00:00 UTC:"));
        assert!(out.contains("Condition   : Scattered clouds"));
        assert!(out.contains("Temperature : 7.5°C (Feels like: 5°C)"));
        assert!(out.contains("Min/Max Temp: 6°C / 9°C"));
        assert!(out.contains("Humidity    : 70%"));
        assert!(out.contains("Wind Speed  : 2.5 m/s"));
        assert!(out.contains("retrieved for 1 of 1 cities"));

        let logged = fs::read_to_string(h.log_path()).unwrap();
        assert!(logged.starts_with("Weather in Paris, FR"));
        assert!(logged.ends_with(&format!("{SEPARATOR}\n")));
        assert!(h.sink.events().is_empty());
    }

    #[tokio::test]
    async fn absent_fetch_never_opens_log() {
        let h = Harness::new(StubFetcher::default());

        let (summary, out) = run(&h, &["Nowhere"]).await;

        assert_eq!(summary, RunSummary { requested: 1, displayed: 0, logged: 0 });
        assert!(out.contains(UNAVAILABLE_NOTICE));
        assert!(!h.log_path().exists());
        // The fetcher owns reporting for its own failures.
        assert!(h.sink.events().is_empty());
    }

    #[tokio::test]
    async fn non_success_status_is_not_displayed_or_logged() {
        let h = Harness::new(
            StubFetcher::default().with("Atlantis", json!({"cod": "404", "message": "city not found"})),
        );

        let (summary, out) = run(&h, &["Atlantis"]).await;

        assert_eq!(summary.displayed, 0);
        assert!(out.contains(UNAVAILABLE_NOTICE));
        assert!(!out.contains("Weather in Atlantis"));
        assert!(!out.contains("Condition   :"));
        assert!(out.contains("retrieved for 0 of 1 cities"));
        assert!(!h.log_path().exists());
    }

    #[tokio::test]
    async fn malformed_success_is_reported_and_run_continues() {
        let mut broken = payload("Oslo", "NO");
        broken.as_object_mut().unwrap().remove("main");
        let h = Harness::new(
            StubFetcher::default()
                .with("Oslo", broken)
                .with("Rome", payload("Rome", "IT")),
        );

        let (summary, out) = run(&h, &["Oslo", "Rome"]).await;

        assert_eq!(summary, RunSummary { requested: 2, displayed: 1, logged: 1 });
        assert!(out.contains(UNAVAILABLE_NOTICE));
        assert!(out.contains("Weather in Rome, IT"));

        let events = h.sink.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].kind, FailureKind::MalformedPayload);
        assert_eq!(events[0].city, "Oslo");
        assert!(events[0].message.contains("main"));

        let logged = fs::read_to_string(h.log_path()).unwrap();
        assert!(!logged.contains("Oslo"));
        assert!(logged.contains("Rome"));
    }

    #[tokio::test]
    async fn wrongly_typed_field_is_reported_as_malformed_payload() {
        let mut broken = payload("Paris", "FR");
        broken["main"]["temp"] = json!("hot");
        let h = Harness::new(StubFetcher::default().with("Paris", broken));

        let (summary, out) = run(&h, &["Paris"]).await;

        assert_eq!(summary, RunSummary { requested: 1, displayed: 0, logged: 0 });
        assert!(out.contains(UNAVAILABLE_NOTICE));
        assert!(!h.log_path().exists());

        let events = h.sink.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].severity, Severity::Error);
        assert_eq!(events[0].kind, FailureKind::MalformedPayload);
        assert!(events[0].message.contains("main.temp"));
    }

    #[tokio::test]
    async fn cities_are_processed_in_order() {
        let h = Harness::new(
            StubFetcher::default()
                .with("Paris", payload("Paris", "FR"))
                .with("Lima", payload("Lima", "PE")),
        );

        let (summary, _) = run(&h, &["Paris", "Nowhere", "Lima"]).await;

        assert_eq!(h.calls(), vec!["Paris", "Nowhere", "Lima"]);
        assert_eq!(summary, RunSummary { requested: 3, displayed: 2, logged: 2 });

        let logged = fs::read_to_string(h.log_path()).unwrap();
        let paris = logged.find("Weather in Paris").unwrap();
        let lima = logged.find("Weather in Lima").unwrap();
        assert!(paris < lima);
    }

    #[tokio::test]
    async fn log_failure_is_reported_and_not_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let sink = Arc::new(RecordingSink::new());
        let pipeline = Pipeline::new(
            Box::new(StubFetcher::default().with("Paris", payload("Paris", "FR"))),
            WeatherLog::new(dir.path().join("no-such-dir").join("log.txt")),
            sink.clone(),
        );

        let mut out = Vec::new();
        let summary = pipeline.run(&["Paris".to_string()], &mut out).await.unwrap();

        assert_eq!(summary, RunSummary { requested: 1, displayed: 1, logged: 0 });
        assert_eq!(sink.kinds(), vec![FailureKind::LogWrite]);
    }

    #[tokio::test]
    async fn interactive_run_fetches_only_entries_before_sentinel() {
        let h = Harness::new(StubFetcher::default().with("Paris", payload("Paris", "FR")));

        let mut out = Vec::new();
        let summary = h
            .pipeline
            .run_interactive(["Paris", "done"], &mut out)
            .await
            .unwrap();

        assert_eq!(h.calls(), vec!["Paris"]);
        assert_eq!(summary, Some(RunSummary { requested: 1, displayed: 1, logged: 1 }));
    }

    #[tokio::test]
    async fn immediate_sentinel_fetches_nothing() {
        let h = Harness::new(StubFetcher::default().with("Paris", payload("Paris", "FR")));

        let mut out = Vec::new();
        let summary = h.pipeline.run_interactive(["done"], &mut out).await.unwrap();

        assert_eq!(summary, None);
        assert!(h.calls().is_empty());
        assert_eq!(String::from_utf8(out).unwrap(), format!("{NO_CITIES_MESSAGE}\n"));
        assert!(!h.log_path().exists());
    }

    #[tokio::test]
    async fn empty_collected_list_fetches_nothing() {
        let h = Harness::new(StubFetcher::default());

        let mut out = Vec::new();
        let summary = h.pipeline.run_cities(Vec::new(), &mut out).await.unwrap();

        assert_eq!(summary, None);
        assert!(h.calls().is_empty());
        assert!(String::from_utf8(out).unwrap().contains(NO_CITIES_MESSAGE));
    }
}
