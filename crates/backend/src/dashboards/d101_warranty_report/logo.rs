use std::time::Duration;

/// JPEG для шапки отчёта. Встраивается в PDF без перекодирования (DCTDecode).
#[derive(Debug, Clone)]
pub struct LogoImage {
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
    /// 1: оттенки серого, 3: RGB, 4: CMYK
    pub components: u8,
}

impl LogoImage {
    /// Прочитать размеры из маркера SOF. Не JPEG -> None.
    pub fn from_jpeg(data: Vec<u8>) -> Option<Self> {
        if data.len() < 4 || data[0] != 0xFF || data[1] != 0xD8 {
            return None;
        }

        let mut i = 2;
        while i + 3 < data.len() {
            if data[i] != 0xFF {
                return None;
            }
            let marker = data[i + 1];
            // заполняющие 0xFF и маркеры без длины
            if marker == 0xFF {
                i += 1;
                continue;
            }
            if marker == 0x01 || (0xD0..=0xD9).contains(&marker) {
                i += 2;
                continue;
            }

            let length = u16::from_be_bytes([data[i + 2], data[i + 3]]) as usize;
            let is_sof = (0xC0..=0xCF).contains(&marker)
                && marker != 0xC4
                && marker != 0xC8
                && marker != 0xCC;
            if is_sof {
                if i + 9 >= data.len() {
                    return None;
                }
                let height = u16::from_be_bytes([data[i + 5], data[i + 6]]) as u32;
                let width = u16::from_be_bytes([data[i + 7], data[i + 8]]) as u32;
                let components = data[i + 9];
                if width == 0 || height == 0 || !matches!(components, 1 | 3 | 4) {
                    return None;
                }
                return Some(Self {
                    data,
                    width,
                    height,
                    components,
                });
            }
            i += 2 + length;
        }
        None
    }
}

/// Скачать логотип. Любая ошибка означает "отчёт без логотипа".
pub async fn fetch_logo(url: &str, timeout_secs: u64) -> Option<LogoImage> {
    let url = url.trim();
    if url.is_empty() {
        return None;
    }

    let client = match reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
    {
        Ok(c) => c,
        Err(e) => {
            tracing::warn!("Failed to create HTTP client for logo: {}", e);
            return None;
        }
    };

    let response = match client.get(url).send().await {
        Ok(r) if r.status().is_success() => r,
        Ok(r) => {
            tracing::warn!("Logo request returned {}", r.status());
            return None;
        }
        Err(e) => {
            tracing::warn!("Could not fetch logo for PDF: {}", e);
            return None;
        }
    };

    let bytes = match response.bytes().await {
        Ok(b) => b.to_vec(),
        Err(e) => {
            tracing::warn!("Failed to read logo body: {}", e);
            return None;
        }
    };

    let logo = LogoImage::from_jpeg(bytes);
    if logo.is_none() {
        tracing::warn!("Logo at {} is not a baseline/progressive JPEG", url);
    }
    logo
}

/// Минимальный заголовок JPEG с SOF0 (для тестов рендерера)
#[cfg(test)]
pub(crate) fn tiny_jpeg(width: u16, height: u16) -> Vec<u8> {
    let mut data = vec![0xFF, 0xD8];
    // APP0 JFIF
    data.extend_from_slice(&[
        0xFF, 0xE0, 0x00, 0x10, b'J', b'F', b'I', b'F', 0x00, 0x01, 0x01, 0x00, 0x00, 0x01, 0x00,
        0x01, 0x00, 0x00,
    ]);
    // SOF0: длина 17, точность 8, высота, ширина, 3 компоненты
    data.extend_from_slice(&[0xFF, 0xC0, 0x00, 0x11, 0x08]);
    data.extend_from_slice(&height.to_be_bytes());
    data.extend_from_slice(&width.to_be_bytes());
    data.extend_from_slice(&[
        0x03, 0x01, 0x22, 0x00, 0x02, 0x11, 0x01, 0x03, 0x11, 0x01,
    ]);
    data.extend_from_slice(&[0xFF, 0xD9]);
    data
}
