pub mod gateway;
pub mod openrouter;
pub mod prompts;

pub use gateway::{
    ChatGateway, ChatGatewayError, ChatGatewayFuture, ChatGatewayRequest, ChatGatewayResponse,
    ChatSession, ChatTokenUsage, ChatTurn, UnconfiguredChatGateway,
};
pub use openrouter::{
    OpenRouterConfigError, OpenRouterGateway, OpenRouterGatewayConfig, OpenRouterModelRoute,
};
pub use prompts::{ChatPurpose, PromptTemplate, slide_outline_prompt, template_for_purpose};
