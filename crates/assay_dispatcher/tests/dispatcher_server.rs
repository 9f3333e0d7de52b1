//! End-to-end dispatch tests against a real database file, with the peer
//! services stubbed at the client seams.

use assay_db::AssayDb;
use assay_dispatcher::{BogSource, DispatcherServer, Launcher};
use assay_protocol::{is_error, methods, MethodTable, RpcMap, RpcRequest, ERROR_KEY};
use tempfile::TempDir;

struct StubQuartermaster {
    bog: RpcMap,
}

impl BogSource for StubQuartermaster {
    fn bill_of_goods(&self, _args: &RpcMap) -> anyhow::Result<RpcMap> {
        Ok(self.bog.clone())
    }
}

struct StubLaunchPad;

impl Launcher for StubLaunchPad {
    fn launch(&self, bog: &RpcMap) -> anyhow::Result<RpcMap> {
        assert_eq!(bog.get("resultsfolder").unwrap(), "/swamp/working/results");
        let mut response = RpcMap::new();
        response.insert("status".to_string(), "launched".to_string());
        Ok(response)
    }
}

type TestServer = DispatcherServer<AssayDb, StubQuartermaster, StubLaunchPad>;

async fn seeded_server() -> (TempDir, AssayDb, TestServer) {
    let tmp = TempDir::new().unwrap();
    let db = AssayDb::open(tmp.path().join("assay.db")).await.unwrap();

    sqlx::query(
        "INSERT INTO execution_record
             (execution_record_uuid, platform_version_uuid, tool_version_uuid,
              package_version_uuid, project_uuid, user_uuid, status)
         VALUES ('run-1', 'pv-1', 'tv-1', 'pkg-1', 'proj-1', 'user-1', 'pending')",
    )
    .execute(db.pool())
    .await
    .unwrap();

    let mut bog = RpcMap::new();
    bog.insert("version".to_string(), "2".to_string());
    bog.insert("execrunid".to_string(), "run-1".to_string());
    bog.insert("platform".to_string(), "/platforms/ubuntu".to_string());

    let server = DispatcherServer::new(
        db.clone(),
        StubQuartermaster { bog },
        StubLaunchPad,
        "/swamp/working/results".to_string(),
        MethodTable::default(),
    );
    (tmp, db, server)
}

fn request(method: &str, pairs: &[(&str, &str)]) -> RpcRequest {
    let mut args = RpcMap::new();
    for (key, value) in pairs {
        args.insert(key.to_string(), value.to_string());
    }
    RpcRequest::new(method, args)
}

#[tokio::test]
async fn test_do_run_end_to_end() {
    let (_tmp, _db, server) = seeded_server().await;

    let results = server
        .dispatch(request(methods::DO_RUN, &[("execrunid", "run-1")]))
        .await;
    assert!(!is_error(&results), "unexpected error: {:?}", results.get(ERROR_KEY));
    assert_eq!(results.get("execrunid").unwrap(), "run-1");
}

#[tokio::test]
async fn test_do_run_unknown_record() {
    let (_tmp, _db, server) = seeded_server().await;

    let results = server
        .dispatch(request(methods::DO_RUN, &[("execrunid", "run-9")]))
        .await;
    assert!(results
        .get(ERROR_KEY)
        .unwrap()
        .contains("has not retrieved the requested exec record"));
}

#[tokio::test]
async fn test_update_execution_results_end_to_end() {
    let (_tmp, db, server) = seeded_server().await;

    let results = server
        .dispatch(request(
            methods::UPDATE_EXECUTION_RESULTS,
            &[
                ("execrunid", "run-1"),
                ("status", "finished"),
                ("run_date", "Mon Jul 4 12:30:05 2016"),
                ("completion_date", "not a date"),
                ("execute_node_architecture_id", "x86_64"),
                ("lines_of_code", "i__1200"),
                ("cpu_utilization", "d__2.5"),
                ("vm_hostname", "vm-7"),
            ],
        ))
        .await;
    assert!(!is_error(&results), "unexpected error: {:?}", results.get(ERROR_KEY));

    let (status, run_date, completion_date, loc, cpu, vm_hostname, vm_username): (
        String,
        String,
        String,
        String,
        String,
        String,
        String,
    ) = sqlx::query_as(
        "SELECT status, run_date, completion_date, lines_of_code, cpu_utilization,
                vm_hostname, vm_username
         FROM execution_record WHERE execution_record_uuid = 'run-1'",
    )
    .fetch_one(db.pool())
    .await
    .unwrap();

    assert_eq!(status, "finished");
    assert_eq!(run_date, "2016-07-04 12:30:05");
    // an unparseable date is stored as the literal "null"
    assert_eq!(completion_date, "null");
    assert_eq!(loc, "1200");
    assert_eq!(cpu, "2.5");
    assert_eq!(vm_hostname, "vm-7");
    // absent vm fields default to empty
    assert_eq!(vm_username, "");
}

#[tokio::test]
async fn test_update_execution_results_unknown_record() {
    let (_tmp, _db, server) = seeded_server().await;

    let results = server
        .dispatch(request(
            methods::UPDATE_EXECUTION_RESULTS,
            &[("execrunid", "run-9"), ("status", "finished")],
        ))
        .await;
    assert_eq!(results.get(ERROR_KEY).unwrap(), "update failed");
}

#[tokio::test]
async fn test_get_single_execution_record_end_to_end() {
    let (_tmp, _db, server) = seeded_server().await;

    let results = server
        .dispatch(request(
            methods::GET_SINGLE_EXECUTION_RECORD,
            &[("execrunid", "run-1")],
        ))
        .await;
    assert!(!is_error(&results));
    assert_eq!(results.get("execrunid").unwrap(), "run-1");
    assert_eq!(results.get("status").unwrap(), "pending");
    // columns never written come back as the literal "null"
    assert_eq!(results.get("run_date").unwrap(), "null");
    assert_eq!(results.get("lines_of_code").unwrap(), "null");
}

#[tokio::test]
async fn test_save_result_end_to_end() {
    let (_tmp, db, server) = seeded_server().await;

    let results = server
        .dispatch(request(
            methods::SAVE_RESULT,
            &[
                ("execrunid", "run-1"),
                ("pathname", "/results/run-1.tar"),
                ("sha512sum", "abc"),
                ("logpathname", "/results/run-1.log"),
                ("log512sum", "def"),
                ("weaknesses", "undefined"),
            ],
        ))
        .await;
    assert!(!is_error(&results));

    let (result_path, source_path, weakness_count): (String, String, i64) = sqlx::query_as(
        "SELECT result_path, source_path, weakness_count
         FROM assessment_result WHERE execution_record_uuid = 'run-1'",
    )
    .fetch_one(db.pool())
    .await
    .unwrap();
    assert_eq!(result_path, "/results/run-1.tar");
    assert_eq!(source_path, "");
    // "undefined" means unknown, recorded as -1
    assert_eq!(weakness_count, -1);
}

#[tokio::test]
async fn test_unknown_method() {
    let (_tmp, _db, server) = seeded_server().await;

    let results = server.dispatch(request("no.suchMethod", &[])).await;
    assert!(results.get(ERROR_KEY).unwrap().contains("unknown method"));
}

#[test]
fn test_malformed_request_gets_error_reply() {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap();
    let (_tmp, _db, server) = runtime.block_on(seeded_server());

    let reply = server.handle_message(&runtime, b"{\"not\": \"an envelope\"");
    assert!(reply.get(ERROR_KEY).unwrap().contains("malformed request"));
}
