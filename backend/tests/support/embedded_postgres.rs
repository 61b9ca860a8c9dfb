//! Embedded PostgreSQL for the Diesel adapter suites.
//!
//! One cluster from `pg-embed-setup-unpriv` is shared per test process. Each
//! test gets its own database cloned from a template that already carries the
//! migrations; the template name includes a hash of `migrations/`, so a schema
//! change provisions a fresh template.
//!
//! Set `SKIP_TEST_CLUSTER=1` where no cluster can start; setup failures then
//! skip the test instead of failing it.

use std::path::PathBuf;
use std::sync::{Mutex, OnceLock};
use std::time::Duration;

use pg_embedded_setup_unpriv::test_support::hash_directory;
use pg_embedded_setup_unpriv::{ClusterHandle, TemporaryDatabase};
use recipe_api::outbound::persistence::run_pending_migrations;
use tokio::runtime::Runtime;
use uuid::Uuid;

const SHARED_CLUSTER_RETRIES: usize = 5;
const PROVISION_RETRIES: usize = 5;
const RETRY_DELAY: Duration = Duration::from_millis(500);
const TEMPLATE_PREFIX: &str = "recipes_template";

static TEMPLATE_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

/// Whether `SKIP_TEST_CLUSTER` is `1`, `true` or `yes` (any case).
pub(crate) fn should_skip_test_cluster() -> bool {
    std::env::var("SKIP_TEST_CLUSTER")
        .map(|value| matches!(value.to_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(false)
}

/// Skip (returning `None`) when allowed, otherwise fail loudly.
pub(crate) fn handle_cluster_setup_failure<T>(reason: impl std::fmt::Display) -> Option<T> {
    if should_skip_test_cluster() {
        eprintln!("SKIP-TEST-CLUSTER: {reason}");
        None
    } else {
        panic!("Test cluster setup failed: {reason}. Set SKIP_TEST_CLUSTER=1 to skip.");
    }
}

/// The process-wide cluster, started on first use.
pub(crate) fn shared_cluster() -> Result<&'static ClusterHandle, String> {
    ensure_stable_password();
    #[cfg(unix)]
    process_exit::acquire_process_lock()?;
    let mut attempt = 1;
    loop {
        match pg_embedded_setup_unpriv::test_support::shared_cluster_handle() {
            Ok(handle) => {
                #[cfg(unix)]
                process_exit::register_cleanup(handle);
                return Ok(handle);
            }
            Err(err) if attempt < SHARED_CLUSTER_RETRIES => {
                eprintln!("pg-embed: cluster start attempt {attempt} failed: {err:?}");
                std::thread::sleep(RETRY_DELAY);
                attempt += 1;
            }
            Err(err) => return Err(format!("{err:?}")),
        }
    }
}

/// `postgresql_embedded` picks a random password per settings value; a data
/// directory reused by a later process keeps the first one.
fn ensure_stable_password() {
    if std::env::var_os("PG_PASSWORD").is_none() {
        // SAFETY: runs before the cluster library starts any threads.
        unsafe {
            std::env::set_var("PG_PASSWORD", "recipes_embedded_test");
        }
    }
}

fn migrations_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("migrations")
}

fn ensure_template(cluster: &ClusterHandle, runtime: &Runtime) -> Result<String, String> {
    let hash = hash_directory(migrations_dir()).map_err(|err| format!("hash migrations: {err}"))?;
    let short_hash = hash.get(..8).unwrap_or(&hash);
    let template = format!("{TEMPLATE_PREFIX}_{short_hash}");

    let _lock = TEMPLATE_LOCK
        .get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(|err| err.into_inner());
    let exists = cluster
        .database_exists(template.as_str())
        .map_err(|err| format!("template check: {err:?}"))?;
    if !exists {
        cluster
            .create_database(template.as_str())
            .map_err(|err| format!("create template: {err:?}"))?;
        let url = cluster.connection().database_url(&template);
        runtime
            .block_on(run_pending_migrations(&url))
            .map_err(|err| format!("migrate template: {err}"))?;
    }
    Ok(template)
}

/// A fresh, migrated database for one test.
///
/// Call outside any Tokio runtime; `runtime` only drives the migrations.
pub(crate) fn provision_database(
    cluster: &ClusterHandle,
    runtime: &Runtime,
) -> Result<TemporaryDatabase, String> {
    let mut last_error = String::from("no provisioning attempt ran");
    for attempt in 1..=PROVISION_RETRIES {
        let provisioned = ensure_template(cluster, runtime).and_then(|template| {
            let name = format!("test_{}", Uuid::new_v4().simple());
            cluster
                .temporary_database_from_template(name.as_str(), template.as_str())
                .map_err(|err| format!("clone {template}: {err:?}"))
        });
        match provisioned {
            Ok(database) => return Ok(database),
            Err(err) => last_error = format!("attempt {attempt}/{PROVISION_RETRIES}: {err}"),
        }
        if attempt < PROVISION_RETRIES {
            std::thread::sleep(RETRY_DELAY);
        }
    }
    Err(last_error)
}

#[cfg(unix)]
mod process_exit {
    //! Stops the shared cluster when the test binary exits.
    //!
    //! The library leaks the cluster guard for the life of the process. Under
    //! `nextest` every test is its own process, and a postmaster left running
    //! blocks the next one from starting on the same data directory. A file
    //! lock serialises processes and an `atexit` hook sends `SIGTERM`.

    use std::ffi::CString;
    use std::os::unix::ffi::OsStrExt;
    use std::path::{Path, PathBuf};
    use std::sync::OnceLock;
    use std::sync::atomic::{AtomicI32, Ordering};
    use std::time::Duration;

    use pg_embedded_setup_unpriv::ClusterHandle;

    const LOCK_FILE: &str = "recipe-api-pg-embedded-shared-cluster.lock";

    static POSTMASTER_PID: AtomicI32 = AtomicI32::new(0);
    static DATA_DIR: OnceLock<PathBuf> = OnceLock::new();
    static LOCK_FD: OnceLock<i32> = OnceLock::new();

    pub(super) fn acquire_process_lock() -> Result<(), String> {
        if LOCK_FD.get().is_some() {
            return Ok(());
        }
        let path = std::env::temp_dir().join(LOCK_FILE);
        let c_path = CString::new(path.as_os_str().as_bytes())
            .map_err(|err| format!("encode lock path {}: {err}", path.display()))?;

        // SAFETY: `c_path` is NUL-terminated and outlives the call.
        let fd = unsafe { libc::open(c_path.as_ptr(), libc::O_CREAT | libc::O_RDWR, 0o600) };
        if fd < 0 {
            let err = std::io::Error::last_os_error();
            return Err(format!("open lock file {}: {err}", path.display()));
        }
        // SAFETY: `fd` is the descriptor opened above.
        if unsafe { libc::flock(fd, libc::LOCK_EX) } != 0 {
            let err = std::io::Error::last_os_error();
            // SAFETY: `fd` is valid and no longer needed.
            unsafe {
                libc::close(fd);
            }
            return Err(format!("lock {}: {err}", path.display()));
        }
        if LOCK_FD.set(fd).is_err() {
            // SAFETY: another caller already holds the lock through its own fd.
            unsafe {
                libc::close(fd);
            }
        }
        Ok(())
    }

    pub(super) fn read_postmaster_pid(data_dir: &Path) -> Option<i32> {
        let dir = cap_std::fs::Dir::open_ambient_dir(data_dir, cap_std::ambient_authority()).ok()?;
        let content = dir.read_to_string("postmaster.pid").ok()?;
        content.lines().next()?.trim().parse().ok()
    }

    extern "C" fn stop_postgres_on_exit() {
        let stored = POSTMASTER_PID.load(Ordering::Relaxed);
        if stored <= 0 {
            return;
        }
        // The pid file is re-read so a recycled pid is never signalled.
        let pid = match DATA_DIR.get().and_then(|dir| read_postmaster_pid(dir)) {
            Some(current) if current == stored => current,
            _ => return,
        };

        // SAFETY: `pid` matches the live `postmaster.pid`.
        if unsafe { libc::kill(pid, libc::SIGTERM) } != 0 {
            return;
        }
        for _ in 0..50 {
            std::thread::sleep(Duration::from_millis(100));
            // SAFETY: signal 0 only checks that the process still exists.
            if unsafe { libc::kill(pid, 0) } != 0 {
                return;
            }
        }
        // SAFETY: same pid, after the graceful shutdown window.
        unsafe {
            libc::kill(pid, libc::SIGKILL);
        }
    }

    pub(super) fn register_cleanup(handle: &ClusterHandle) {
        let data_dir = &handle.settings().data_dir;
        let Some(pid) = read_postmaster_pid(data_dir) else {
            return;
        };
        if POSTMASTER_PID
            .compare_exchange(0, pid, Ordering::Relaxed, Ordering::Relaxed)
            .is_err()
        {
            return;
        }
        let _already_set = DATA_DIR.set(data_dir.clone());

        // SAFETY: `stop_postgres_on_exit` is an `extern "C"` fn with no
        // preconditions beyond the statics set above.
        let rc = unsafe { libc::atexit(stop_postgres_on_exit) };
        if rc != 0 {
            eprintln!("pg-embed: atexit registration failed (rc={rc}); postmaster {pid} may outlive the tests");
        }
    }
}
