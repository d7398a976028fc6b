use uuid::Uuid;

// 工作台ID
pub type SessionId = Uuid;
// 题目在返回列表中的下标
pub type QuestionIndex = usize;
// 选项标签，如 "A"
pub type OptionTag = String;
