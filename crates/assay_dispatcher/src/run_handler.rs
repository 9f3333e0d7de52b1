//! Assessment run dispatch.
//!
//! `do_run` is the write barrier between the assessment store and the
//! execution fabric: fetch the run record, have the quartermaster assemble
//! the bill of goods, append the results folder, and hand the inventory to
//! the launch pad. Any failure, including a transport fault, becomes an
//! `error` response; errors reported by a peer pass through verbatim.

use crate::clients::{BogSource, Launcher};
use crate::store::ExecStore;
use assay_protocol::bog::keys;
use assay_protocol::{put_error, RpcMap, ERROR_KEY};
use tracing::{error, info, warn};

/// Dispatch one assessment run.
pub async fn do_run<S, Q, L>(
    store: &S,
    quartermaster: &Q,
    launch_pad: &L,
    results_folder: &str,
    args: &RpcMap,
) -> RpcMap
where
    S: ExecStore,
    Q: BogSource,
    L: Launcher,
{
    let mut results = RpcMap::new();

    let Some(exec_run_id) = required(args, keys::EXEC_RUN_ID) else {
        put_error(&mut results, "bad assessment run ID");
        return results;
    };
    results.insert(keys::EXEC_RUN_ID.to_string(), exec_run_id.to_string());

    info!(exec_run_id, "request to do run");

    // Fetch the execution record
    let records = match store.execution_records(exec_run_id).await {
        Ok(records) => records,
        Err(err) => {
            error!(exec_run_id, %err, "execution record retrieval failed");
            put_error(
                &mut results,
                format!("error retrieving the assessment run: {}", err),
            );
            return results;
        }
    };
    let Some(record) = records.first() else {
        put_error(
            &mut results,
            "assessment DB has not retrieved the requested exec record",
        );
        return results;
    };
    if records.len() > 1 {
        warn!(exec_run_id, "multiple execution records retrieved, using the first");
    }
    if !record.execution_record_uuid.eq_ignore_ascii_case(exec_run_id) {
        put_error(
            &mut results,
            "assessment DB has retrieved record with mismatched exec run ID",
        );
        return results;
    }

    // Assemble the bill of goods
    let mut qm_args = RpcMap::new();
    qm_args.insert(keys::EXEC_RUN_ID.to_string(), exec_run_id.to_string());
    qm_args.insert("platformid".to_string(), record.platform_version_uuid.clone());
    qm_args.insert("toolid".to_string(), record.tool_version_uuid.clone());
    qm_args.insert("packageid".to_string(), record.package_version_uuid.clone());
    qm_args.insert(keys::PROJECT_ID.to_string(), record.project_uuid.clone());
    qm_args.insert(keys::USER_ID.to_string(), record.user_uuid.clone());

    let mut bog = match quartermaster.bill_of_goods(&qm_args) {
        Ok(bog) => bog,
        Err(err) => {
            error!(exec_run_id, %err, "quartermaster request failed");
            put_error(&mut results, format!("error requesting the bill of goods: {}", err));
            return results;
        }
    };
    if bog.is_empty() {
        put_error(&mut results, "quartermaster returned a null bill of goods");
        return results;
    }
    if let Some(message) = bog.get(ERROR_KEY) {
        // quartermaster diagnostics pass through verbatim
        put_error(&mut results, message.clone());
        return results;
    }

    bog.insert(keys::RESULTS_FOLDER.to_string(), results_folder.to_string());

    // Hand off to the launch pad
    let launch_result = match launch_pad.launch(&bog) {
        Ok(result) => result,
        Err(err) => {
            error!(exec_run_id, %err, "launch pad request failed");
            put_error(&mut results, format!("error launching the assessment run: {}", err));
            return results;
        }
    };
    if launch_result.is_empty() {
        put_error(&mut results, "launchpad returned a null result");
        return results;
    }
    if let Some(message) = launch_result.get(ERROR_KEY) {
        put_error(&mut results, message.clone());
        return results;
    }

    info!(exec_run_id, "assessment run dispatched");
    results
}

fn required<'a>(args: &'a RpcMap, key: &str) -> Option<&'a str> {
    args.get(key).map(String::as_str).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use assay_db::{DbError, ExecRecord, ExecStatusUpdate, Result as DbResult, ResultRecord};
    use assay_protocol::is_error;
    use std::cell::{Cell, RefCell};

    struct MockStore {
        records: Vec<ExecRecord>,
        calls: Cell<usize>,
    }

    impl MockStore {
        fn with_record(uuid: &str) -> Self {
            Self {
                records: vec![make_record(uuid)],
                calls: Cell::new(0),
            }
        }

        fn empty() -> Self {
            Self {
                records: vec![],
                calls: Cell::new(0),
            }
        }
    }

    impl ExecStore for MockStore {
        async fn execution_records(&self, _uuid: &str) -> DbResult<Vec<ExecRecord>> {
            self.calls.set(self.calls.get() + 1);
            Ok(self.records.clone())
        }

        async fn update_execution_run_status(&self, _: &ExecStatusUpdate) -> DbResult<bool> {
            Err(DbError::invalid_state("not used"))
        }

        async fn insert_results(&self, _: &ResultRecord) -> DbResult<bool> {
            Err(DbError::invalid_state("not used"))
        }
    }

    fn make_record(uuid: &str) -> ExecRecord {
        ExecRecord {
            execution_record_uuid: uuid.to_string(),
            platform_version_uuid: "pv-1".to_string(),
            tool_version_uuid: "tv-1".to_string(),
            package_version_uuid: "pkg-1".to_string(),
            project_uuid: "proj-1".to_string(),
            user_uuid: "user-1".to_string(),
            status: "pending".to_string(),
            run_date: "null".to_string(),
            completion_date: "null".to_string(),
            cpu_utilization: "null".to_string(),
            lines_of_code: "null".to_string(),
            execute_node_architecture_id: "null".to_string(),
        }
    }

    struct MockQuartermaster {
        response: anyhow::Result<RpcMap>,
        calls: Cell<usize>,
        seen_args: RefCell<Option<RpcMap>>,
    }

    impl MockQuartermaster {
        fn returning(bog: RpcMap) -> Self {
            Self {
                response: Ok(bog),
                calls: Cell::new(0),
                seen_args: RefCell::new(None),
            }
        }

        fn failing(message: &str) -> Self {
            Self {
                response: Err(anyhow!("{}", message.to_string())),
                calls: Cell::new(0),
                seen_args: RefCell::new(None),
            }
        }
    }

    impl BogSource for MockQuartermaster {
        fn bill_of_goods(&self, args: &RpcMap) -> anyhow::Result<RpcMap> {
            self.calls.set(self.calls.get() + 1);
            *self.seen_args.borrow_mut() = Some(args.clone());
            match &self.response {
                Ok(bog) => Ok(bog.clone()),
                Err(err) => Err(anyhow!("{}", err)),
            }
        }
    }

    struct MockLaunchPad {
        response: RpcMap,
        calls: Cell<usize>,
        seen_bog: RefCell<Option<RpcMap>>,
    }

    impl MockLaunchPad {
        fn ok() -> Self {
            let mut response = RpcMap::new();
            response.insert("status".to_string(), "launched".to_string());
            Self {
                response,
                calls: Cell::new(0),
                seen_bog: RefCell::new(None),
            }
        }
    }

    impl Launcher for MockLaunchPad {
        fn launch(&self, bog: &RpcMap) -> anyhow::Result<RpcMap> {
            self.calls.set(self.calls.get() + 1);
            *self.seen_bog.borrow_mut() = Some(bog.clone());
            Ok(self.response.clone())
        }
    }

    fn good_bog() -> RpcMap {
        let mut bog = RpcMap::new();
        bog.insert("version".to_string(), "2".to_string());
        bog.insert("execrunid".to_string(), "run-1".to_string());
        bog.insert("platform".to_string(), "/platforms/ubuntu".to_string());
        bog
    }

    fn run_args(id: &str) -> RpcMap {
        let mut args = RpcMap::new();
        args.insert("execrunid".to_string(), id.to_string());
        args
    }

    #[tokio::test]
    async fn test_do_run_happy_path() {
        let store = MockStore::with_record("run-1");
        let qm = MockQuartermaster::returning(good_bog());
        let pad = MockLaunchPad::ok();

        let results = do_run(&store, &qm, &pad, "/results", &run_args("run-1")).await;
        assert!(!is_error(&results), "unexpected error: {:?}", results.get(ERROR_KEY));
        assert_eq!(results.get("execrunid").unwrap(), "run-1");

        // exactly one assembly and one launch
        assert_eq!(qm.calls.get(), 1);
        assert_eq!(pad.calls.get(), 1);

        // the quartermaster got the record's ids
        let seen = qm.seen_args.borrow().clone().unwrap();
        assert_eq!(seen.get("platformid").unwrap(), "pv-1");
        assert_eq!(seen.get("toolid").unwrap(), "tv-1");
        assert_eq!(seen.get("packageid").unwrap(), "pkg-1");
        assert_eq!(seen.get("projectid").unwrap(), "proj-1");
        assert_eq!(seen.get("userid").unwrap(), "user-1");

        // the launch pad got the bog with the results folder appended
        let bog = pad.seen_bog.borrow().clone().unwrap();
        assert_eq!(bog.get("resultsfolder").unwrap(), "/results");
        assert_eq!(bog.get("platform").unwrap(), "/platforms/ubuntu");
    }

    #[tokio::test]
    async fn test_do_run_missing_id_touches_nothing() {
        let store = MockStore::with_record("run-1");
        let qm = MockQuartermaster::returning(good_bog());
        let pad = MockLaunchPad::ok();

        let results = do_run(&store, &qm, &pad, "/results", &RpcMap::new()).await;
        assert_eq!(results.get(ERROR_KEY).unwrap(), "bad assessment run ID");
        assert_eq!(store.calls.get(), 0);
        assert_eq!(qm.calls.get(), 0);
        assert_eq!(pad.calls.get(), 0);
    }

    #[tokio::test]
    async fn test_do_run_record_not_found_never_calls_peers() {
        let store = MockStore::empty();
        let qm = MockQuartermaster::returning(good_bog());
        let pad = MockLaunchPad::ok();

        let results = do_run(&store, &qm, &pad, "/results", &run_args("run-1")).await;
        assert!(results
            .get(ERROR_KEY)
            .unwrap()
            .contains("has not retrieved the requested exec record"));
        assert_eq!(qm.calls.get(), 0);
        assert_eq!(pad.calls.get(), 0);
    }

    #[tokio::test]
    async fn test_do_run_id_match_is_case_insensitive() {
        let store = MockStore::with_record("RUN-1");
        let qm = MockQuartermaster::returning(good_bog());
        let pad = MockLaunchPad::ok();

        let results = do_run(&store, &qm, &pad, "/results", &run_args("run-1")).await;
        assert!(!is_error(&results));
    }

    #[tokio::test]
    async fn test_do_run_mismatched_record_id() {
        let store = MockStore::with_record("run-2");
        let qm = MockQuartermaster::returning(good_bog());
        let pad = MockLaunchPad::ok();

        let results = do_run(&store, &qm, &pad, "/results", &run_args("run-1")).await;
        assert!(results.get(ERROR_KEY).unwrap().contains("mismatched exec run ID"));
        assert_eq!(qm.calls.get(), 0);
    }

    #[tokio::test]
    async fn test_do_run_bog_error_passes_through_and_skips_launch() {
        let mut bog = good_bog();
        bog.insert(
            ERROR_KEY.to_string(),
            "tool store has not retrieved the requested tool".to_string(),
        );
        let store = MockStore::with_record("run-1");
        let qm = MockQuartermaster::returning(bog);
        let pad = MockLaunchPad::ok();

        let results = do_run(&store, &qm, &pad, "/results", &run_args("run-1")).await;
        assert_eq!(
            results.get(ERROR_KEY).unwrap(),
            "tool store has not retrieved the requested tool"
        );
        assert_eq!(pad.calls.get(), 0);
    }

    #[tokio::test]
    async fn test_do_run_empty_bog_is_an_error() {
        let store = MockStore::with_record("run-1");
        let qm = MockQuartermaster::returning(RpcMap::new());
        let pad = MockLaunchPad::ok();

        let results = do_run(&store, &qm, &pad, "/results", &run_args("run-1")).await;
        assert!(results.get(ERROR_KEY).unwrap().contains("null bill of goods"));
        assert_eq!(pad.calls.get(), 0);
    }

    #[tokio::test]
    async fn test_do_run_transport_failure_is_caught() {
        let store = MockStore::with_record("run-1");
        let qm = MockQuartermaster::failing("connection refused");
        let pad = MockLaunchPad::ok();

        let results = do_run(&store, &qm, &pad, "/results", &run_args("run-1")).await;
        assert!(results.get(ERROR_KEY).unwrap().contains("connection refused"));
        assert_eq!(pad.calls.get(), 0);
    }

    #[tokio::test]
    async fn test_do_run_launch_error_passes_through() {
        struct ErrLaunchPad;
        impl Launcher for ErrLaunchPad {
            fn launch(&self, _bog: &RpcMap) -> anyhow::Result<RpcMap> {
                let mut response = RpcMap::new();
                response.insert(ERROR_KEY.to_string(), "no capacity".to_string());
                Ok(response)
            }
        }

        let store = MockStore::with_record("run-1");
        let qm = MockQuartermaster::returning(good_bog());

        let results = do_run(&store, &qm, &ErrLaunchPad, "/results", &run_args("run-1")).await;
        assert_eq!(results.get(ERROR_KEY).unwrap(), "no capacity");
    }
}
