//! Built-in default settings
//!
//! `log_directory` and `crashdump_dir` depend on the environment and are
//! inserted after the template is parsed, see [`LOG_DIRECTORY`] and
//! [`CRASHDUMP_DIR`].

/// Logging options: INFO, DEBUG. Hash methods: content, timestamp.
pub const DEFAULT_CONFIG: &str = "
[logging]
workflow_level = INFO
utils_level = INFO
interface_level = INFO
log_to_file = false
log_size = 16384000
log_rotate = 4

[execution]
create_report = true
display_variable = :1
hash_method = timestamp
job_finished_timeout = 5
keep_inputs = false
local_hash_check = true
matplotlib_backend = Agg
plugin = Linear
remove_node_directories = false
remove_unnecessary_outputs = true
try_hard_link_datasink = true
single_thread_matlab = true
crashfile_format = pklz
stop_on_first_crash = false
stop_on_first_rerun = false
use_relative_paths = false
stop_on_unknown_version = false
write_provenance = false
parameterize_dirs = true
poll_sleep_duration = 2
xvfb_max_wait = 10
resource_monitor = false
resource_monitor_frequency = 1

[check]
interval = 1209600
";

/// `(section, option)` defaulting to the user's home directory
pub const LOG_DIRECTORY: (&str, &str) = ("logging", "log_directory");

/// `(section, option)` defaulting to the working directory at construction
pub const CRASHDUMP_DIR: (&str, &str) = ("execution", "crashdump_dir");

/// Sections bulk updates are allowed to touch
pub const UPDATABLE_SECTIONS: [&str; 3] = ["execution", "logging", "check"];

/// Sections scanned when migrating deprecated options
pub const ALIASED_SECTIONS: [&str; 2] = ["execution", "logging"];
