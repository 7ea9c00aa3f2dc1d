//! Diesel schema for workflow checkpoints.

diesel::table! {
    /// Latest workflow state per session.
    workflow_checkpoints (session_id) {
        /// Session key.
        #[max_length = 255]
        session_id -> Varchar,
        /// Serialized workflow state.
        state -> Jsonb,
        /// Last save timestamp.
        updated_at -> Timestamptz,
    }
}
