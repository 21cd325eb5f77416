/*!
 * Client implementations for backend model runtimes.
 *
 * Currently a single backend: Ollama, the local LLM runtime the chat proxy
 * forwards to. Each client owns its reqwest connection pool and maps
 * transport or non-success responses onto `ServiceError::UpstreamUnreachable`.
 */

pub mod ollama;
