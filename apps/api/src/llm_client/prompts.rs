// Cross-cutting prompt fragments shared by every service that calls the LLM.
// Service-specific prompts live in a prompts.rs next to the service.

/// Closing instruction for every structured-output call.
pub const JSON_SCHEMA_OUTPUT: &str = "OUTPUT: Return ONLY JSON that matches the provided schema.";

/// Guardrail shared by tutoring prompts: guide, never hand over solutions.
pub const NO_CODE_DUMPS: &str = "\
HARD RULES:
- Do NOT provide copy-pasteable code or shell commands.
- Do NOT use fenced code blocks or multi-line code-like snippets.
- Keep content concrete: \"create file X\", \"add function Y with purpose Z\", \"verify by ...\".";
