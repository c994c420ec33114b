//! Default TOML config template with inline documentation comments.

/// Generate the default TOML config content with comments.
pub(crate) fn default_config_toml() -> String {
    r##"# SympAI Configuration
# Schema version 1
# Only override what you want to change -- missing fields use defaults.

[api]
# endpoint = "http://127.0.0.1:8000"
# api_key = ""               # or set SYMPAI_API_KEY
# client_id = "sympai"       # sent as User-Agent
# connect_timeout_secs = 10  # 1-120

[chat]
# model = "gpt-3.5-turbo"
# max_tokens = 4000          # 1-128000, history is trimmed to this budget
# temperature = 1.0          # 0.0-2.0
# top_p = 1.0                # 0.0-1.0
# presence_penalty = 0.0     # -2.0-2.0
# frequency_penalty = 0.0    # -2.0-2.0

[preferences]
# auto_title = true
# count_total_tokens = true
# language = "en-US"         # en-US, zh-CN, zh-TW, da, de, es, fr, it, ja, ms, nb, ro, ru, sv

[logging]
# level = "INFO"             # DEBUG, INFO, WARNING, ERROR
"##
    .to_string()
}
