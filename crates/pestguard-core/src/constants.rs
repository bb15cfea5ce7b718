/// PestGuard: centralized constants.
/// All magic numbers, strings, and limits live here.
/// Never hardcode these values elsewhere.

// ─── Models ───────────────────────────────────────────────────────────────────

pub mod models {
    pub const DEFAULT_DASHSCOPE_MODEL: &str = "qwen-turbo";
    pub const DEFAULT_ARK_MODEL: &str = "doubao-seed-1-6-thinking-250715";
    pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";

    /// Sampling temperature used by the pest advisor chat.
    pub const DEFAULT_TEMPERATURE: f32 = 0.8;
}

// ─── API Endpoints ────────────────────────────────────────────────────────────

pub mod endpoints {
    pub const DASHSCOPE_BASE_URL: &str = "https://dashscope.aliyuncs.com/compatible-mode/v1";
    pub const ARK_BASE_URL: &str = "https://ark.cn-beijing.volces.com/api/v3";
    pub const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
}

// ─── Accounts ─────────────────────────────────────────────────────────────────

pub mod accounts {
    /// Account provisioned into an empty store on first login attempt.
    pub const DEFAULT_USERNAME: &str = "123456";
    pub const DEFAULT_PASSWORD: &str = "123456";
    pub const USERS_FILE: &str = "users.json";
}

// ─── Assistant ────────────────────────────────────────────────────────────────

pub mod assistant {
    /// Upper bound on history length after a completed turn, system prompt included.
    pub const MAX_HISTORY: usize = 10;
    pub const DEFAULT_TIMEOUT_SECS: u64 = 60;
    /// Confidence above which a detection counts as high-confidence in reports.
    pub const HIGH_CONFIDENCE: f32 = 0.7;

    pub const SYSTEM_PROMPT: &str = "You are a professional agricultural pest control expert, \
        responsible for identifying crop pests and giving treatment advice. \
        Answer the user's questions clearly and practically.";

    pub const ADVISOR_PROMPT: &str = "You are a professional agricultural pest control expert, \
        responsible for identifying crop pests and giving treatment advice. \
        Based on the detection results, output structured JSON listing physical, biological, \
        chemical and other mitigation points for every category.";

    pub const FORMAT_RULES: &str = "Output JSON whose key is categories and whose value is an array. \
        Every array item has this fixed structure:\n\
        {\"name\": category name, \"count\": number, \"physical\": [points...], \
        \"biological\": [points...], \"chemical\": [points...], \"other\": [points...]}\n\
        Output exactly one well-formed JSON object and nothing else: \
        no explanation, no prefix or suffix, no Markdown code fence.";

    pub const ANALYST_PROMPT: &str = "You are a professional computer vision analyst, \
        skilled at reviewing object detection results and giving in-depth insights.";
    pub const ANALYSIS_TEMPERATURE: f32 = 0.3;

    pub const NO_DETECTION_NOTICE: &str =
        "No image has been analysed yet. Upload an image and run detection first.";

    /// Substrings that switch a user turn into a structured mitigation request.
    pub const TRIGGER_TERMS: &[&str] = &[
        "治理", "防治", "处理", "消灭", "杀灭", "控制", "预防",
        "control", "treat", "prevent", "eliminate", "kill", "manage", "mitigat",
    ];
}

// ─── Config Paths ─────────────────────────────────────────────────────────────

pub mod paths {
    pub const CONFIG_DIR: &str = "pestguard";
    pub const CONFIG_FILE: &str = "config.toml";
    pub const RECORDS_DIR: &str = "records";
}
