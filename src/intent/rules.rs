//! Built-in intent rule tables.
//!
//! Patterns run against normalized text (lowercase, single spaces).
//! Dangerous categories come first so an ambiguous request lands on the
//! conservative side.

use super::IntentCategory;

pub(super) struct RuleSpec {
    pub id: &'static str,
    pub category: IntentCategory,
    pub pattern: &'static str,
    pub confidence: f64,
}

pub(super) struct SafeContextSpec {
    pub id: &'static str,
    pub from: IntentCategory,
    pub to: IntentCategory,
    pub pattern: &'static str,
    pub confidence: f64,
    /// Only applies when the text carries no [`WRITE_VERBS`].
    pub read_only: bool,
}

/// Verbs that void a read-only safe context.
pub(super) const WRITE_VERBS: &str = r"\b(write|update|insert|modify|change|edit|overwrite|alter|delete|remove|drop|truncate|disable|replace|rotate|revoke|grant|upload|send|copy|move|rename|chmod|chown)\b";

pub(super) const INTENT_RULES: &[RuleSpec] = &[
    RuleSpec {
        id: "destructive.drop_database",
        category: IntentCategory::DestructiveAction,
        pattern: r"\b(drop|delete|truncate|wipe|erase|destroy|purge)\b.*\b(databases?|db|tables?|schemas?|collections?)\b",
        confidence: 0.95,
    },
    RuleSpec {
        id: "destructive.delete_files",
        category: IntentCategory::DestructiveAction,
        pattern: r"\b(delete|remove|erase|shred)\b.*\b(files?|director(y|ies)|folders?)\b",
        confidence: 0.95,
    },
    RuleSpec {
        id: "destructive.rm_recursive",
        category: IntentCategory::DestructiveAction,
        pattern: r"\brm\s+-[a-z]*r",
        confidence: 0.98,
    },
    RuleSpec {
        id: "destructive.format_disk",
        category: IntentCategory::DestructiveAction,
        pattern: r"\b(format|wipe|erase)\b.*\b(disks?|drives?|partitions?|system)\b",
        confidence: 0.98,
    },
    RuleSpec {
        id: "destructive.shutdown",
        category: IntentCategory::DestructiveAction,
        pattern: r"\b(shutdown|shut down|reboot|halt)\b.*\b(servers?|system|machines?|hosts?)\b",
        confidence: 0.9,
    },
    RuleSpec {
        id: "destructive.kill_process",
        category: IntentCategory::DestructiveAction,
        pattern: r"\b(kill|terminate)\b.*\b(process(es)?|services?)\b",
        confidence: 0.9,
    },
    RuleSpec {
        id: "code.execute",
        category: IntentCategory::CodeExecution,
        pattern: r"\b(execute|run|eval)\b.*\b(code|scripts?|commands?|binar(y|ies))\b",
        confidence: 0.9,
    },
    RuleSpec {
        id: "code.shell",
        category: IntentCategory::CodeExecution,
        pattern: r"\b(system|shell|bash|terminal|powershell) commands?\b",
        confidence: 0.95,
    },
    RuleSpec {
        id: "code.subprocess",
        category: IntentCategory::CodeExecution,
        pattern: r"\bsubprocess\b|\bos\.(system|popen)\b|\bexec\s*\(",
        confidence: 0.9,
    },
    RuleSpec {
        id: "system.settings",
        category: IntentCategory::SystemModification,
        pattern: r"\b(modify|change|edit|overwrite|alter|disable|reconfigure)\b.*\b(settings|configuration|config|permissions|environment variables?|firewall)\b",
        confidence: 0.85,
    },
    RuleSpec {
        id: "system.privileges",
        category: IntentCategory::SystemModification,
        pattern: r"\b(sudo|chmod|chown|root access|escalate privileges?|privilege escalation)\b",
        confidence: 0.9,
    },
    RuleSpec {
        id: "system.credentials",
        category: IntentCategory::SystemModification,
        pattern: r"\b(keys|api keys?|credentials?|passwords?|secrets?|access tokens?)\b",
        confidence: 0.85,
    },
    RuleSpec {
        id: "conversational.greeting",
        category: IntentCategory::Conversational,
        pattern: r"^(hi|hello|hey|howdy|greetings|good (morning|afternoon|evening))\b",
        confidence: 0.95,
    },
    RuleSpec {
        id: "conversational.small_talk",
        category: IntentCategory::Conversational,
        pattern: r"\b(how are you|thank you|thanks)\b",
        confidence: 0.9,
    },
    RuleSpec {
        id: "help.request",
        category: IntentCategory::HelpRequest,
        pattern: r"\b(help|assist|support|guide)\b",
        confidence: 0.9,
    },
    RuleSpec {
        id: "informational.question",
        category: IntentCategory::Informational,
        pattern: r"\b(what is|what are|how does|how do|explain|tell me about|describe)\b",
        confidence: 0.9,
    },
    RuleSpec {
        id: "analysis.request",
        category: IntentCategory::Analysis,
        pattern: r"\b(analy[sz]e|compare|evaluate|assess|summari[sz]e)\b",
        confidence: 0.8,
    },
    RuleSpec {
        id: "data_retrieval.request",
        category: IntentCategory::DataRetrieval,
        pattern: r"\b(show me|display|list|provide|give me|fetch|retrieve|get|find|query|select)\b",
        confidence: 0.8,
    },
];

pub(super) const SAFE_CONTEXT_RULES: &[SafeContextSpec] = &[
    SafeContextSpec {
        id: "safe.node_keys",
        from: IntentCategory::SystemModification,
        to: IntentCategory::DataRetrieval,
        pattern: r"\bprovide\b.*\bkeys?\b.*\bfor\b.*\b(node|method|class)\b",
        confidence: 0.85,
        read_only: false,
    },
    SafeContextSpec {
        id: "safe.schema_keys",
        from: IntentCategory::SystemModification,
        to: IntentCategory::DataRetrieval,
        pattern: r"\b(primary|foreign|unique|composite|partition|sort) keys?\b|\bkeys?\b.*\b(of|in|from|for)\b.*\b(database|db|table|node|graph|schema|index)\b",
        confidence: 0.8,
        read_only: false,
    },
    SafeContextSpec {
        id: "safe.password_help",
        from: IntentCategory::SystemModification,
        to: IntentCategory::HelpRequest,
        pattern: r"\b(reset|forgot|forgotten|recover)\b.*\bpasswords?\b",
        confidence: 0.85,
        read_only: false,
    },
    SafeContextSpec {
        id: "safe.file_read",
        from: IntentCategory::SystemModification,
        to: IntentCategory::DataRetrieval,
        pattern: r"^(please |can you |could you )?(read|open|view|show|display|cat|print)\b.*\bfiles?\b",
        confidence: 0.8,
        read_only: true,
    },
    SafeContextSpec {
        id: "safe.select_query",
        from: IntentCategory::SystemModification,
        to: IntentCategory::DataRetrieval,
        pattern: r"^(please |can you |could you )?(select|query)\b.*\b(columns?|fields?|rows?|tables?|from|where)\b",
        confidence: 0.8,
        read_only: true,
    },
];
