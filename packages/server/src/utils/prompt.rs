//! Instruction templates sent to the generative model.
//!
//! Students read the output in Indonesian, so the instructions are written in Indonesian too.

pub const TITLE: &str = "Analisis file yang telah saya berikan. Buatlah judul yang singkat dan \
menarik berdasarkan konten file tersebut. Judul harus menggambarkan isi dari seluruh file yang \
diberikan.

PENTING: Berikan response HANYA berupa text judul, tanpa tanda kutip atau format lainnya.";

pub const SUMMARIZE_DOCUMENT: &str = "Rangkumlah keseluruhan isi file berikut ini. Jangan isi \
penjelasan lain seperti 'file ini berisi bla-bla', langsung berikan rangkumannya";

pub const DESCRIBE_DOCUMENT: &str = "Jelaskan isi file berikut ini secara lengkap dan terstruktur. \
Sertakan poin-poin penting, definisi, dan contoh yang ada di dalamnya. Langsung berikan \
penjelasannya tanpa pembuka.";

const QUIZ_FORMAT: &str = r#"[
  {
    "number": 1,
    "question": "YOUR_QUESTION_HERE",
    "option_a": "OPTION_A_TEXT",
    "option_b": "OPTION_B_TEXT",
    "option_c": "OPTION_C_TEXT",
    "option_d": "OPTION_D_TEXT",
    "correct_answer": "CORRECT_ANSWER_TEXT"
  }
]"#;

/// Ask for `count` multiple-choice questions as a bare JSON array.
pub fn quiz(count: usize) -> String {
    format!(
        "Analisis file yang telah saya berikan pada Anda. Buatlah quiz dengan {count} soal. \
Pastikan semua soal berhubungan dengan file yang saya berikan. Jika ada beberapa file, maka \
pastikan semua file terdapat pada soal. Sesuaikan bahasa soal dan jawaban dengan bahasa file \
yang telah saya berikan.

PENTING: Berikan response HANYA dalam format JSON array yang valid seperti contoh berikut:
{QUIZ_FORMAT}

- Buat {count} soal (number: 1 sampai {count})
- correct_answer harus berisi teks jawaban yang benar, bukan huruf opsi
- Pastikan JSON format valid dan bisa di-parse
- Jangan tambahkan teks apapun selain JSON array
"
    )
}

/// Condense the concatenated per-file summaries into one explanation.
pub fn simplify_summaries(summaries: &str) -> String {
    format!(
        "Berikut ini adalah rangkuman dari beberapa file, berikan aku penjelasan yang mudah \
dimengerti dan ringkas. Jawab prompt ini tanpa penjelasan lainnya dan hanya berikan \
ringkasannya saja\n\n{summaries}"
    )
}

/// Ask for a title of an explanation produced by [`simplify_summaries`].
pub fn summary_title(summary: &str) -> String {
    format!(
        "Berikan aku satu judul yang cocok untuk rangkuman ini. Jawab prompt ini tanpa \
penjelasan lain dan hanya judulnya saja\n\n{summary}"
    )
}

/// Wrap a student's question together with descriptions of the files they attached.
pub fn attachment_question<'a>(
    prompt: &str,
    descriptions: impl IntoIterator<Item = (&'a str, &'a str)>,
) -> String {
    let mut question = format!(
        "Kamu adalah asisten AI yang bertugas menjawab pertanyaan pengguna berdasarkan file \
yang telah mereka lampirkan. File tersebut sudah saya bacakan dan sampaikan langsung kepadamu, \
seolah-olah kamu membacanya sendiri.
Jawablah pertanyaan pengguna dengan jelas, langsung, dan berdasarkan isi file tersebut. Hindari \
menyebut bahwa kamu mendapatkan ringkasan atau bantuan dari pihak lain.
Pertanyaan dari pengguna: {prompt}
Berikut adalah isi file yang dilampirkan oleh pengguna:"
    );
    for (name, description) in descriptions {
        question.push_str(&format!("\nFile {name}: {description}"));
    }
    question
}
