//! Prompt construction for the generation service.

use tracing::instrument;

use crate::schema::{GameKind, OPTIONS_PER_QUESTION};

/// Questions the quiz-show bank must contain.
pub const QUIZ_BANK_SIZE: usize = 50;

/// Upper bound on pairs for the memory game.
pub const MEMORY_MAX_PAIRS: usize = 12;

/// Builds the single instruction prompt around `raw_text`.
#[instrument(skip(raw_text), fields(raw_len = raw_text.len()))]
pub fn build_prompt(raw_text: &str) -> String {
    let tags = GameKind::SUPPORTED
        .iter()
        .map(|kind| format!("\"{}\"", kind.tag()))
        .collect::<Vec<_>>()
        .join(" | ");

    format!(
        r#"VAI TRÒ: Bạn vừa là giáo viên tiểu học giàu kinh nghiệm, vừa là chuyên gia tiếng Việt và nhà thiết kế trò chơi học tập cho trẻ em.

NHIỆM VỤ: Đọc DỮ LIỆU THÔ bên dưới và chọn ĐÚNG MỘT loại trò chơi phù hợp nhất:
1. {quiz}: dữ liệu là câu hỏi trắc nghiệm (câu hỏi + các phương án A, B, C, D + đáp án đúng).
2. {memory}: dữ liệu là các cặp tương ứng như "từ vựng - nghĩa" hoặc "từ - hình ảnh" (ít hơn {max_pairs} cặp).
3. {matching}: dữ liệu là hai danh sách cần nối với nhau.
4. {bubble}: dữ liệu là yêu cầu tìm các phần tử đúng trong một tập hợp.
5. {open_box}: dữ liệu là danh sách câu hỏi mở.
6. {image}: dữ liệu mô tả hình ảnh và yêu cầu đoán từ khóa.

YÊU CẦU ĐẶC BIỆT:
- Với {quiz}: tạo ngân hàng gồm ĐÚNG {bank} câu hỏi. Nếu dữ liệu thô có ít hơn, hãy tự soạn thêm câu hỏi cùng chủ đề cho đủ {bank} câu. Mỗi câu có đúng {options} phương án, và "answer" phải trùng khớp nguyên văn với một phương án.
- Mỗi câu trả lời đúng kèm một lời giải thích ngắn gọn trong "explanation".
- Ngôn ngữ trong sáng, dễ hiểu, phù hợp với học sinh tiểu học.

DỮ LIỆU THÔ:
{raw}

ĐỊNH DẠNG ĐẦU RA: chỉ trả về một đối tượng JSON duy nhất:
{{
  "type": {tags},
  "title": "Tên trò chơi sinh động",
  "description": "Mô tả ngắn về trò chơi",
  "reason": "Lý do chọn loại trò chơi này",
  "items": [ ... ]
}}
Cấu trúc mỗi phần tử của "items":
- {quiz}, {open_box}, {image}: {{ "id": "q1", "text": "Câu hỏi?", "options": ["A", "B", "C", "D"], "answer": "Nội dung đáp án đúng", "explanation": "Vì sao đúng" }}
- {memory}, {matching}: {{ "id": "p1", "left": "Vế 1", "right": "Vế 2" }}
- {bubble}: {{ "id": "b1", "text": "Từ", "isCorrect": true }}
"#,
        quiz = GameKind::RungChuongVang.tag(),
        memory = GameKind::Memory.tag(),
        matching = GameKind::Matching.tag(),
        bubble = GameKind::BubblePop.tag(),
        open_box = GameKind::WhatsInBox.tag(),
        image = GameKind::GuessImage.tag(),
        max_pairs = MEMORY_MAX_PAIRS,
        bank = QUIZ_BANK_SIZE,
        options = OPTIONS_PER_QUESTION,
        raw = raw_text,
        tags = tags,
    )
}
