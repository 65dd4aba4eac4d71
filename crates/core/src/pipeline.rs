//! Fetch-and-load runs.
//!
//! One run fetches the report, records execution history, and loads the report into every target
//! table. The server may answer with a confirmation prompt instead of data; the caller decides
//! whether to go ahead, and if so the fetch is repeated with `confirm_api_hits=no`. This is a loop
//! over attempts, each with a fresh run ID from the caller.

use crate::constants::{CONFIRM_API_HITS_PARAM, RUN_ID_PARAM};
use crate::csv::parse_csv;
use crate::fetch::{build_request, check_response, Fetcher};
use crate::history::{append_history, RunContext};
use crate::loader::populate_table;
use crate::sections::decode_sections;
use crate::settings::Settings;
use crate::table::TableStore;
use crate::LoadResult;
use sheetload_types::{LoadPolicy, TableName};

/// The caller's answer to a confirmation prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Proceed,
    Cancel,
}

/// Rows written to one target table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableLoad {
    pub table: TableName,
    pub rows_written: usize,
}

/// Summary of a completed load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadReport {
    pub run_id: String,
    pub policy: LoadPolicy,
    pub loads: Vec<TableLoad>,
    /// Whether the payload carried a note for the anchor cell.
    pub note_attached: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    Loaded(LoadReport),
    /// The caller declined the server's confirmation prompt.
    Cancelled { message: String },
}

/// Runs report fetches against a [`Fetcher`].
#[derive(Debug, Clone)]
pub struct ReportService<F> {
    fetcher: F,
}

impl<F: Fetcher> ReportService<F> {
    pub fn new(fetcher: F) -> Self {
        Self { fetcher }
    }

    /// Fetches the report described by `settings` and loads it into `store`.
    ///
    /// `next_run_id` supplies the run ID for each attempt. `decide` is consulted whenever the
    /// server returns a confirmation prompt.
    ///
    /// # Errors
    ///
    /// Invalid settings are rejected before any request is sent. A non-200 response ends the run
    /// with `LoadError::TransportFailure` before any table is touched.
    pub fn run<S, R, D>(
        &self,
        store: &mut S,
        settings: &Settings,
        mut next_run_id: R,
        mut decide: D,
    ) -> LoadResult<RunOutcome>
    where
        S: TableStore,
        R: FnMut() -> String,
        D: FnMut(&str) -> Decision,
    {
        settings.validate()?;

        let email = settings.param("email").unwrap_or_default().to_owned();
        let mut params = settings.params.clone();

        loop {
            let run_id = next_run_id();
            params.insert(RUN_ID_PARAM.to_owned(), run_id.clone());

            let request = build_request(settings, &params)?;
            tracing::info!(run_id = %run_id, "fetching report");
            let body = check_response(self.fetcher.post(&request)?)?;
            let sections = decode_sections(&body);

            if let Some(block) = sections.history_block.as_deref().filter(|b| !b.is_empty()) {
                let context = RunContext {
                    target_tables: &settings.target_tables,
                    policy: settings.policy,
                    email: &email,
                    run_id: &run_id,
                };
                append_history(store, &context, block)?;
            }

            if let Some(message) = sections.confirmation_message.filter(|m| !m.is_empty()) {
                match decide(&message) {
                    Decision::Cancel => {
                        tracing::info!(run_id = %run_id, "confirmation declined");
                        return Ok(RunOutcome::Cancelled { message });
                    }
                    Decision::Proceed => {
                        params.insert(CONFIRM_API_HITS_PARAM.to_owned(), "no".to_owned());
                        continue;
                    }
                }
            }

            let rows = parse_csv(&sections.report_body);
            let note = sections.note.as_deref().filter(|n| !n.is_empty());

            let mut loads = Vec::with_capacity(settings.target_tables.len());
            for name in &settings.target_tables {
                let table = store.table_or_create(name)?;
                let rows_written = populate_table(table, rows.clone(), settings.policy, note)?;
                loads.push(TableLoad {
                    table: name.clone(),
                    rows_written,
                });
            }

            return Ok(RunOutcome::Loaded(LoadReport {
                run_id,
                policy: settings.policy,
                loads,
                note_attached: note.is_some(),
            }));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::HISTORY_TABLE_NAME;
    use crate::fetch::{FetchRequest, FetchResponse};
    use crate::table::{Table, Workbook, Worksheet};
    use crate::LoadError;
    use std::cell::RefCell;
    use std::collections::VecDeque;

    /// Replays canned responses and records every request it receives.
    #[derive(Default)]
    struct ScriptedFetcher {
        responses: RefCell<VecDeque<FetchResponse>>,
        requests: RefCell<Vec<FetchRequest>>,
    }

    impl ScriptedFetcher {
        fn new(responses: &[(u16, &str)]) -> Self {
            Self {
                responses: RefCell::new(
                    responses
                        .iter()
                        .map(|(status, body)| FetchResponse {
                            status: *status,
                            body: body.to_string(),
                        })
                        .collect(),
                ),
                requests: RefCell::default(),
            }
        }

        fn sent_params(&self, idx: usize) -> serde_json::Value {
            serde_json::from_str(&self.requests.borrow()[idx].body).unwrap()
        }
    }

    impl Fetcher for &ScriptedFetcher {
        fn post(&self, request: &FetchRequest) -> LoadResult<FetchResponse> {
            self.requests.borrow_mut().push(request.clone());
            self.responses
                .borrow_mut()
                .pop_front()
                .ok_or_else(|| LoadError::InvalidInput("no scripted response left".into()))
        }
    }

    fn name(s: &str) -> TableName {
        TableName::new(s).unwrap()
    }

    fn settings(policy: LoadPolicy, targets: &[&str]) -> Settings {
        let mut settings = Settings {
            url: "https://reports.example.com/run".into(),
            target_tables: targets.iter().map(|t| name(t)).collect(),
            policy,
            ..Settings::default()
        };
        settings.params.insert("api_key".into(), "k1".into());
        settings.params.insert("email".into(), "ana@example.com".into());
        settings
    }

    fn run_ids() -> impl FnMut() -> String {
        let mut counter = 0;
        move || {
            counter += 1;
            format!("run{counter}")
        }
    }

    #[test]
    fn test_transport_failure_leaves_store_untouched() {
        let fetcher = ScriptedFetcher::new(&[(500, "boom")]);
        let mut workbook = Workbook::new();
        workbook.insert(Worksheet::with_rows(name("Sales"), vec![vec!["old".into()]]));
        let before = workbook.clone();

        let err = ReportService::new(&fetcher)
            .run(&mut workbook, &settings(LoadPolicy::Overwrite, &["Sales"]), run_ids(), |_| {
                Decision::Proceed
            })
            .expect_err("500 should fail");

        assert!(matches!(
            err,
            LoadError::TransportFailure { status: 500, ref body } if body == "boom"
        ));
        assert_eq!(workbook, before);
    }

    #[test]
    fn test_invalid_settings_send_no_request() {
        let fetcher = ScriptedFetcher::new(&[]);
        let mut settings = settings(LoadPolicy::Overwrite, &["Sales"]);
        settings.url = "reports.example.com".into();

        let err = ReportService::new(&fetcher)
            .run(&mut Workbook::new(), &settings, run_ids(), |_| Decision::Proceed)
            .expect_err("invalid url");

        assert!(matches!(err, LoadError::InvalidInput(_)));
        assert!(fetcher.requests.borrow().is_empty());
    }

    #[test]
    fn test_loads_report_into_every_target() {
        let payload = "#A1_NOTE_START#3 rows#A1_NOTE_END#\n\
                       #REPORT_DATA_START#\nid,name\n1,\"Smith, J\"\n2\n#REPORT_DATA_END#";
        let fetcher = ScriptedFetcher::new(&[(200, payload)]);
        let mut workbook = Workbook::new();

        let outcome = ReportService::new(&fetcher)
            .run(
                &mut workbook,
                &settings(LoadPolicy::Overwrite, &["Sales", "Ops"]),
                run_ids(),
                |_| Decision::Proceed,
            )
            .unwrap();

        let RunOutcome::Loaded(report) = outcome else {
            panic!("expected a load");
        };
        assert_eq!(report.run_id, "run1");
        assert!(report.note_attached);
        assert_eq!(report.loads.len(), 2);
        assert!(report.loads.iter().all(|load| load.rows_written == 3));

        let sales = workbook.table(&name("Sales")).unwrap();
        assert_eq!(sales.values().unwrap()[1], vec!["1", "Smith, J"]);
        assert_eq!(sales.values().unwrap()[2], vec!["2", ""]);
        assert!(sales
            .anchor_note()
            .unwrap()
            .unwrap()
            .starts_with("Update Mode: overwrite\n\n3 rows\n"));
        assert!(workbook.table(&name(HISTORY_TABLE_NAME)).is_none());

        let sent = fetcher.sent_params(0);
        assert_eq!(sent["runid"], "run1");
        assert_eq!(sent["email"], "ana@example.com");
    }

    #[test]
    fn test_confirmation_accepted_refetches_with_flag() {
        let fetcher = ScriptedFetcher::new(&[
            (
                200,
                "#CONFIRMATION_MSG_START#This will use 120 API calls.#CONFIRMATION_MSG_END#\n\
                 #EXECUTION_HISTORY_START#t0, 0.4, 0, 1#EXECUTION_HISTORY_END#",
            ),
            (
                200,
                "#EXECUTION_HISTORY_START#t1, 9.1, 2, 120#EXECUTION_HISTORY_END#\nh\nv1\nv2",
            ),
        ]);
        let mut workbook = Workbook::new();
        let mut prompts = Vec::new();

        let outcome = ReportService::new(&fetcher)
            .run(
                &mut workbook,
                &settings(LoadPolicy::Append, &["Sales"]),
                run_ids(),
                |message| {
                    prompts.push(message.to_owned());
                    Decision::Proceed
                },
            )
            .unwrap();

        assert_eq!(prompts, vec!["This will use 120 API calls."]);
        assert_eq!(fetcher.sent_params(0).get("confirm_api_hits"), None);
        assert_eq!(fetcher.sent_params(1)["confirm_api_hits"], "no");
        assert_eq!(fetcher.sent_params(1)["runid"], "run2");

        let RunOutcome::Loaded(report) = outcome else {
            panic!("expected a load");
        };
        assert_eq!(report.run_id, "run2");
        assert_eq!(report.loads[0].rows_written, 3);

        let history = workbook
            .table(&name(HISTORY_TABLE_NAME))
            .unwrap()
            .values()
            .unwrap();
        assert_eq!(history.len(), 3);
        assert_eq!(history[1][3], "run1");
        assert_eq!(history[2][3], "run2");
        assert_eq!(history[2][7], "120");
    }

    #[test]
    fn test_confirmation_declined_loads_nothing() {
        let fetcher = ScriptedFetcher::new(&[(
            200,
            "#CONFIRMATION_MSG_START#Proceed?#CONFIRMATION_MSG_END#\na,b",
        )]);
        let mut workbook = Workbook::new();

        let outcome = ReportService::new(&fetcher)
            .run(
                &mut workbook,
                &settings(LoadPolicy::Overwrite, &["Sales"]),
                run_ids(),
                |_| Decision::Cancel,
            )
            .unwrap();

        assert_eq!(
            outcome,
            RunOutcome::Cancelled {
                message: "Proceed?".into()
            }
        );
        assert!(workbook.table_names().is_empty());
        assert_eq!(fetcher.requests.borrow().len(), 1);
    }

    #[test]
    fn test_append_run_skips_header_on_populated_table() {
        let fetcher = ScriptedFetcher::new(&[(200, "id,v\n3,c\n4,d\n")]);
        let mut workbook = Workbook::new();
        workbook.insert(Worksheet::with_rows(
            name("Sales"),
            vec![
                vec!["id".into(), "v".into()],
                vec!["1".into(), "a".into()],
            ],
        ));

        ReportService::new(&fetcher)
            .run(
                &mut workbook,
                &settings(LoadPolicy::Append, &["Sales"]),
                run_ids(),
                |_| Decision::Proceed,
            )
            .unwrap();

        let values = workbook.table(&name("Sales")).unwrap().values().unwrap();
        assert_eq!(values.len(), 4);
        assert_eq!(values[2], vec!["3", "c"]);
        assert_eq!(values[3], vec!["4", "d"]);
    }
}
