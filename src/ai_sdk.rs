mod gemini;

pub(crate) use gemini::{
    GenerateContentResponse, ProviderErrorResponse, build_request, reply_from_response,
};
