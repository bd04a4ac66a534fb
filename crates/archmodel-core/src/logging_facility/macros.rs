//! Operation boundary macros
//!
//! Every boundary operation (`load_rules`, `project_element`, `project_all`,
//! `tracker_build`) emits exactly one start event and one end or end_error
//! event. All three macros expand to a single `tracing` event carrying the
//! canonical `component`, `op` and `event` fields from
//! `archmodel_core_types::schema`; callers append their own fields.

/// Emit one canonical operation event at `$level`
#[doc(hidden)]
#[macro_export]
macro_rules! __log_op_event {
    ($level:ident, $op:expr, $event:expr $(, $($field:tt)*)?) => {
        tracing::$level!(
            component = module_path!(),
            op = $op,
            event = $event,
            $($($field)*)?
        )
    };
}

/// Log the start of an operation
///
/// ```
/// # use archmodel_core::log_op_start;
/// let source_id = "business.service.customer-management";
/// log_op_start!("project_element", element_id = %source_id, target_layer = "application");
/// log_op_start!("tracker_build", element_count = 42usize);
/// ```
#[macro_export]
macro_rules! log_op_start {
    ($op:expr $(, $($field:tt)*)?) => {
        $crate::__log_op_event!(
            info,
            $op,
            $crate::logging_facility::schema::EVENT_START
            $(, $($field)*)?
        )
    };
}

/// Log the successful end of an operation; `duration_ms` is mandatory
///
/// ```
/// # use archmodel_core::log_op_end;
/// # use std::time::Instant;
/// let start = Instant::now();
/// log_op_end!(
///     "project_all",
///     duration_ms = start.elapsed().as_millis() as u64,
///     projected_count = 3usize,
///     skipped_count = 1usize
/// );
/// ```
#[macro_export]
macro_rules! log_op_end {
    ($op:expr, duration_ms = $duration:expr $(, $($field:tt)*)?) => {
        $crate::__log_op_event!(
            info,
            $op,
            $crate::logging_facility::schema::EVENT_END,
            duration_ms = $duration
            $(, $($field)*)?
        )
    };
}

/// Log a failed operation
///
/// `$err` is anything convertible into `ExError`; its kind and stable code
/// land in `err.kind` and `err.code`.
///
/// ```
/// # use archmodel_core::log_op_error;
/// # use archmodel_core::errors::ArchModelError;
/// let err = ArchModelError::RuleLoad {
///     reason: "missing 'projections' list".to_string(),
/// };
/// log_op_error!("load_rules", err, duration_ms = 3);
///
/// let err = ArchModelError::ElementAlreadyExists {
///     element_id: "application.service.customer-management-service".to_string(),
/// };
/// log_op_error!("project_element", err, duration_ms = 1, element_id = "business.service.customer-management");
/// ```
#[macro_export]
macro_rules! log_op_error {
    ($op:expr, $err:expr, duration_ms = $duration:expr $(, $($field:tt)*)?) => {{
        let ex_err: $crate::errors::ExError = $err.into();
        $crate::__log_op_event!(
            error,
            $op,
            $crate::logging_facility::schema::EVENT_END_ERROR,
            duration_ms = $duration,
            err.kind = ?ex_err.kind(),
            err.code = ex_err.code()
            $(, $($field)*)?
        )
    }};
}
