// Resume intake: PDF text extraction plus LLM-driven analysis of the extracted text.
// All LLM calls go through llm_client.

pub mod analysis;
pub mod extract;
pub mod handlers;
pub mod prompts;
